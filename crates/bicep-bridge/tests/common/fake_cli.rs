//! In-memory stand-in for the CLI end of a framed JSON-RPC channel
//!
//! Drives a real [`MessageRouter`] over a duplex stream so tests exercise
//! framing and id correlation exactly as a spawned CLI would.

use bicep_transport::MessageRouter;
use bicep_transport::framing::{FrameReader, write_frame};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{DuplexStream, ReadHalf, WriteHalf, duplex, split};

/// The CLI side of the channel
pub struct FakeCli {
    frames: FrameReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
}

impl FakeCli {
    /// A router and the fake CLI it is connected to
    pub fn connect() -> (Arc<MessageRouter>, FakeCli) {
        let (ours, theirs) = duplex(64 * 1024);
        let (our_read, our_write) = split(ours);
        let (their_read, their_write) = split(theirs);

        let router = Arc::new(MessageRouter::start(our_read, our_write));
        let cli = FakeCli {
            frames: FrameReader::new(their_read),
            writer: their_write,
        };
        (router, cli)
    }

    /// Read the next request; panics if the channel closed
    pub async fn next_request(&mut self) -> Value {
        let body = self
            .frames
            .read_frame()
            .await
            .expect("frame")
            .expect("channel closed");
        serde_json::from_slice(&body).expect("request JSON")
    }

    /// Answer the request with `id`
    pub async fn reply(&mut self, id: &Value, result: Value) {
        self.send(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
            .await;
    }

    /// Answer the request with `id` with an error object
    pub async fn reply_error(&mut self, id: &Value, code: i64, message: &str) {
        self.send(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }))
        .await;
    }

    /// Expect a version query and answer it
    pub async fn answer_version(&mut self, version: &str) {
        let request = self.next_request().await;
        assert_eq!(request["method"], "bicep/version");
        assert_eq!(request["params"], json!({}));
        self.reply(&request["id"], json!({ "version": version })).await;
    }

    async fn send(&mut self, message: Value) {
        let body = serde_json::to_vec(&message).expect("response JSON");
        write_frame(&mut self.writer, &body).await.expect("write frame");
    }
}
