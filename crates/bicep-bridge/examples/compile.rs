//! Compile a Bicep file through the CLI's JSON-RPC interface
//!
//! ## Usage
//!
//! ```bash
//! export BICEP_CLI_PATH=$HOME/.azure/bin/bicep
//! cargo run -p bicep-bridge --example compile -- main.bicep
//!
//! # Over a unix socket instead of stdio, with debug logging
//! BICEP_CHANNEL=pipe RUST_LOG=bicep_transport=debug cargo run -p bicep-bridge --example compile -- main.bicep
//! ```

use anyhow::{Context, bail};
use bicep_bridge::{Bridge, BridgeConfig, CompileRequest, FormatRequest, GetFileReferencesRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let Some(file) = std::env::args().nth(1) else {
        bail!("usage: compile <file.bicep>");
    };
    let path = std::fs::canonicalize(&file)
        .with_context(|| format!("cannot resolve {}", file))?
        .display()
        .to_string();

    let config = BridgeConfig::from_env()?;
    let bridge = Bridge::initialize_with_config(config).await?;
    println!("Bicep CLI {}", bridge.version().await?);

    let result = run(&bridge, &path).await;
    bridge.dispose().await;
    result
}

async fn run(bridge: &Bridge, path: &str) -> anyhow::Result<()> {
    let refs = bridge
        .get_file_references(&GetFileReferencesRequest::new(path))
        .await?;
    println!("References {} file(s)", refs.file_paths.len());

    let compiled = bridge.compile(&CompileRequest::new(path)).await?;
    for diagnostic in &compiled.diagnostics {
        println!(
            "{}({},{}) {:?} {}: {}",
            diagnostic.source,
            diagnostic.range.start.line + 1,
            diagnostic.range.start.char + 1,
            diagnostic.level,
            diagnostic.code,
            diagnostic.message
        );
    }
    if !compiled.success {
        bail!("compilation failed");
    }
    println!("Template is {} bytes", compiled.contents.unwrap_or_default().len());

    // Older CLIs lack formatting; report and carry on
    match bridge.format(&FormatRequest::new(path)).await {
        Ok(formatted) => println!("Formatted source is {} bytes", formatted.contents.len()),
        Err(err) => println!("Skipping format: {}", err),
    }

    Ok(())
}
