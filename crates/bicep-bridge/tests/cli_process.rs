//! End-to-end tests against a spawned process speaking the CLI's protocol
//!
//! A small shell script stands in for `bicep jsonrpc --stdio`: it reads
//! `Content-Length` frames, answers `bicep/version` with a configurable
//! version and `bicep/format` with fixed contents, and records its pid.

#![cfg(unix)]

use bicep_bridge::{Bridge, BridgeConfig, BridgeError, BridgeState, ChannelMode, FormatRequest};
use std::path::PathBuf;
use tempfile::TempDir;

const FAKE_CLI: &str = r##"
echo $$ > "$FAKE_BICEP_PID_FILE"
while :; do
  length=
  while IFS= read -r line; do
    line=$(printf '%s' "$line" | tr -d '\r')
    if [ -z "$line" ]; then break; fi
    case "$line" in
      [Cc]ontent-[Ll]ength:*) length=$(printf '%s' "${line#*:}" | tr -d ' ') ;;
    esac
  done
  if [ -z "$length" ]; then exit 0; fi
  body=$(dd bs=1 count="$length" 2>/dev/null)
  id=$(printf '%s' "$body" | sed -n 's/.*"id":\([0-9][0-9]*\).*/\1/p')
  case "$body" in
    *'"bicep/version"'*) result="{\"version\":\"$FAKE_BICEP_VERSION\"}" ;;
    *'"bicep/format"'*) result='{"contents":"param location string\n"}' ;;
    *) result='null' ;;
  esac
  response="{\"jsonrpc\":\"2.0\",\"id\":$id,\"result\":$result}"
  printf 'Content-Length: %s\r\n\r\n%s' "${#response}" "$response"
done
"##;

struct FakeCli {
    dir: TempDir,
}

impl FakeCli {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bicep.sh"), FAKE_CLI).unwrap();
        Self { dir }
    }

    fn pid_file(&self) -> PathBuf {
        self.dir.path().join("cli.pid")
    }

    /// Runs the script through `sh`, which then sees `jsonrpc --stdio`
    fn config(&self, version: &str) -> BridgeConfig {
        let script = self.dir.path().join("bicep.sh");
        BridgeConfig::new("/bin/sh")
            .with_args([script.display().to_string(), "jsonrpc".to_string()])
            .with_mode(ChannelMode::Stdio)
            .with_env("FAKE_BICEP_VERSION", version)
            .with_env("FAKE_BICEP_PID_FILE", self.pid_file().display().to_string())
    }

    fn pid(&self) -> String {
        std::fs::read_to_string(self.pid_file())
            .unwrap()
            .trim()
            .to_string()
    }

    /// Whether the process still exists, zombies included
    fn process_exists(&self) -> bool {
        std::process::Command::new("/bin/sh")
            .args(["-c", &format!("kill -0 {} 2>/dev/null", self.pid())])
            .status()
            .unwrap()
            .success()
    }
}

#[tokio::test]
async fn test_initialize_at_baseline_over_stdio() {
    let cli = FakeCli::new();

    let bridge = Bridge::initialize_with_config(cli.config("0.25.3"))
        .await
        .unwrap();

    assert_eq!(bridge.state(), BridgeState::Ready);
    assert_eq!(bridge.version().await.unwrap(), "0.25.3");
    assert!(cli.process_exists());

    // Below the format minimum: rejected before anything is sent
    let err = bridge
        .format(&FormatRequest::new("/src/main.bicep"))
        .await
        .unwrap_err();
    assert_eq!(err.required_version(), Some("0.37.0"));

    bridge.dispose().await;
    bridge.dispose().await;
    assert!(!cli.process_exists());
}

#[tokio::test]
async fn test_initialize_below_baseline_reaps_process() {
    let cli = FakeCli::new();

    let err = Bridge::initialize_with_config(cli.config("0.25.2"))
        .await
        .unwrap_err();

    match err {
        BridgeError::UnsupportedVersion { actual, minimum } => {
            assert_eq!(actual, "0.25.2");
            assert_eq!(minimum, "0.25.3");
        }
        other => panic!("expected UnsupportedVersion, got {:?}", other),
    }
    assert!(!cli.process_exists());
}

#[tokio::test]
async fn test_gated_operation_over_stdio() {
    let cli = FakeCli::new();
    let bridge = Bridge::initialize_with_config(cli.config("0.37.1"))
        .await
        .unwrap();

    let formatted = bridge
        .format(&FormatRequest::new("/src/main.bicep"))
        .await
        .unwrap();

    assert_eq!(formatted.contents, "param location string\n");
    bridge.dispose().await;
}
