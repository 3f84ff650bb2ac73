//! Content-Length message framing
//!
//! The CLI uses the same base protocol as the Language Server Protocol:
//!
//! ```text
//! Content-Length: 52\r\n
//! \r\n
//! {"jsonrpc":"2.0","id":1,"method":"bicep/version",...}
//! ```
//!
//! Header names are case-insensitive and headers other than
//! `Content-Length` (such as `Content-Type`) are ignored.

use crate::error::{Result, TransportError};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

const CONTENT_LENGTH: &str = "content-length";

/// Largest message body accepted from the CLI
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Longest header line accepted, including its line terminator
const MAX_HEADER_LINE: u64 = 8 * 1024;

/// Reads framed message bodies from a byte stream
pub struct FrameReader<R> {
    inner: BufReader<R>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
        }
    }

    /// Read the next message body
    ///
    /// Returns `Ok(None)` on a clean end of stream between frames.
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let mut content_length: Option<usize> = None;
        let mut in_header = false;
        let mut line = String::new();

        loop {
            line.clear();
            let read = (&mut self.inner)
                .take(MAX_HEADER_LINE)
                .read_line(&mut line)
                .await?;
            if read == 0 {
                if in_header {
                    return Err(TransportError::Connection(
                        "stream ended inside a message header".to_string(),
                    ));
                }
                return Ok(None);
            }

            if !line.ends_with('\n') && read as u64 == MAX_HEADER_LINE {
                return Err(TransportError::Protocol(format!(
                    "header line longer than {} bytes",
                    MAX_HEADER_LINE
                )));
            }

            let header = line.trim_end_matches(['\r', '\n']);
            if header.is_empty() {
                if in_header {
                    break;
                }
                continue;
            }
            in_header = true;

            let (name, value) = header.split_once(':').ok_or_else(|| {
                TransportError::Protocol(format!("malformed header line {:?}", header))
            })?;
            if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
                let length: usize = value.trim().parse().map_err(|_| {
                    TransportError::Protocol(format!("invalid Content-Length {:?}", value.trim()))
                })?;
                if length > MAX_FRAME_SIZE {
                    return Err(TransportError::Protocol(format!(
                        "Content-Length {} exceeds the {} byte limit",
                        length, MAX_FRAME_SIZE
                    )));
                }
                content_length = Some(length);
            }
        }

        let length = content_length.ok_or_else(|| {
            TransportError::Protocol("message header has no Content-Length".to_string())
        })?;

        // Grows with the bytes actually received, not the announced length
        let mut body = Vec::new();
        (&mut self.inner)
            .take(length as u64)
            .read_to_end(&mut body)
            .await?;
        if body.len() < length {
            return Err(TransportError::Connection(
                "stream ended inside a message body".to_string(),
            ));
        }

        Ok(Some(body))
    }
}

/// Write one framed message body and flush
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, body: &[u8]) -> Result<()> {
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}
