//! Subprocess transport tests against real executables
//!
//! These use standard system programs in place of the Bicep CLI to exercise
//! spawn failures, early exits and disposal without needing the CLI itself.

use bicep_transport::{CliTransport, ProcessConfig, Transport, TransportError};
use serde_json::json;

#[tokio::test]
async fn test_open_missing_executable_is_connection_error() {
    let result = CliTransport::open(ProcessConfig::new("/definitely/not/here/bicep")).await;

    assert!(matches!(result, Err(TransportError::Connection(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_that_exits_fails_requests_with_connection_error() {
    // `false` ignores its arguments and exits immediately
    let transport = CliTransport::open(ProcessConfig::new("false"))
        .await
        .expect("spawning `false` should succeed");

    let result = transport.send_request("bicep/version", json!({})).await;
    assert!(
        matches!(result, Err(TransportError::Connection(_))),
        "unexpected result: {:?}",
        result
    );

    transport.dispose().await;
    assert!(transport.is_disposed());
}

#[cfg(unix)]
#[tokio::test]
async fn test_pipe_mode_detects_exit_before_connect() {
    use bicep_transport::ChannelMode;

    let result =
        CliTransport::open(ProcessConfig::new("false").with_mode(ChannelMode::Pipe)).await;

    match result {
        Err(TransportError::Connection(msg)) => assert!(msg.contains("exited before connecting")),
        Err(other) => panic!("expected Connection error, got {:?}", other),
        Ok(_) => panic!("expected open to fail"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_dispose_is_idempotent_and_rejects_later_requests() {
    // `cat` keeps running until its stdin closes, like the CLI does
    let transport = CliTransport::open(ProcessConfig::new("cat").with_args(Vec::<String>::new()))
        .await
        .expect("spawning `cat` should succeed");
    assert!(transport.is_alive().await);
    assert!(transport.pid().await.is_some());

    transport.dispose().await;
    transport.dispose().await;

    assert!(transport.is_disposed());
    assert!(!transport.is_alive().await);
    assert!(matches!(
        transport.send_request("bicep/version", json!({})).await,
        Err(TransportError::Disposed)
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_dispose_resolves_in_flight_request() {
    let transport = std::sync::Arc::new(
        CliTransport::open(ProcessConfig::new("sleep").with_args(["30"]))
            .await
            .expect("spawning `sleep` should succeed"),
    );

    let call = {
        let transport = std::sync::Arc::clone(&transport);
        tokio::spawn(async move { transport.send_request("bicep/compile", json!({})).await })
    };

    // Wait until the request is registered before tearing down
    while transport.pending_count() == 0 {
        tokio::task::yield_now().await;
    }
    transport.dispose().await;

    assert!(matches!(call.await.unwrap(), Err(TransportError::Disposed)));
}
