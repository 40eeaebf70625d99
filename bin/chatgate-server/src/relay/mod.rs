//! Stream relay: backend completion stream → client chunk stream.
//!
//! One inbound request is paired 1:1 with one outbound backend connection.
//! A forwarder task reads the backend's byte stream, decodes it with
//! [`decode`], and pushes chunks through a **bounded** channel – when the
//! client stops draining, the channel fills and the task stops pulling
//! backend bytes, so a slow client never causes unbounded buffering.  When
//! the client disconnects, the channel closes, the task returns, and
//! dropping the backend response closes that connection too.

pub mod decode;

use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use decode::{parse_fragment, ChunkBuffer, LineDecoder};

/// In-flight chunks the client may lag behind before backend reads pause.
const CHANNEL_CAPACITY: usize = 32;

/// Connection-level relay failures.
///
/// Failures *during* an established stream never surface here – the stream
/// just flushes and ends early – so these only describe what can go wrong
/// before the first byte arrives.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("could not connect to backend: {0}")]
    ConnectionFailed(#[source] reqwest::Error),

    #[error("backend returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

/// Relay tuning knobs, derived from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Streaming completion endpoint of the backend.
    pub backend_url: String,
    /// Deadline for each individual backend read.
    pub read_timeout: Duration,
}

/// Open a streaming completion for `prompt` and return the cleaned,
/// re-chunked client stream.
///
/// The returned stream is finite and forward-only: it ends when the backend
/// closes its connection, emits its last record, or stops producing within
/// the read deadline.  Whatever is buffered at that point is flushed as a
/// final chunk first.
pub async fn stream_completion(
    client: &reqwest::Client,
    opts: &RelayOptions,
    prompt: &str,
) -> Result<ReceiverStream<Bytes>, BackendError> {
    let response = client
        .post(&opts.backend_url)
        // llama-server gzips otherwise, which defeats incremental parsing.
        .header(reqwest::header::ACCEPT_ENCODING, "identity")
        .json(&serde_json::json!({ "prompt": prompt, "stream": true }))
        .send()
        .await
        .map_err(BackendError::ConnectionFailed)?;

    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::UnexpectedStatus(status));
    }

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(forward(response, tx, opts.read_timeout));
    Ok(ReceiverStream::new(rx))
}

/// Pump the backend byte stream into the client channel until one side ends.
async fn forward(response: reqwest::Response, tx: mpsc::Sender<Bytes>, read_timeout: Duration) {
    let mut body = response.bytes_stream();
    let mut lines = LineDecoder::new();
    let mut chunks = ChunkBuffer::new();

    loop {
        // Watch for the client going away even while the backend is quiet
        // or producing nothing flushable; otherwise a disconnect would only
        // be noticed at the next chunk send.
        let read = tokio::select! {
            read = tokio::time::timeout(read_timeout, body.next()) => match read {
                Ok(read) => read,
                Err(_) => {
                    warn!(timeout_secs = read_timeout.as_secs(), "backend read timed out; ending stream");
                    break;
                }
            },
            _ = tx.closed() => {
                debug!("client disconnected; abandoning backend stream");
                return;
            }
        };

        let bytes = match read {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                warn!(error = %e, "backend stream error; ending stream");
                break;
            }
            None => {
                debug!("backend stream finished");
                break;
            }
        };

        lines.push(&bytes);
        while let Some(line) = lines.next_line() {
            let Some(fragment) = parse_fragment(&line) else {
                continue;
            };
            if let Some(chunk) = chunks.push(&fragment) {
                if tx.send(Bytes::from(chunk)).await.is_err() {
                    // Client went away; dropping `body` closes the backend
                    // connection so the generation stops too.
                    debug!("client disconnected mid-stream");
                    return;
                }
            }
        }
    }

    // A final record without a trailing newline still carries content.
    let tail = lines.take_remainder();
    if !tail.is_empty() {
        if let Some(fragment) = parse_fragment(&tail) {
            if let Some(chunk) = chunks.push(&fragment) {
                if tx.send(Bytes::from(chunk)).await.is_err() {
                    return;
                }
            }
        }
    }

    // Whatever is still buffered goes out before the stream ends.
    if let Some(rest) = chunks.finish() {
        let _ = tx.send(Bytes::from(rest)).await;
    }
}
