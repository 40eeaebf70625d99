//! Decoding of the backend's streaming wire format.
//!
//! llama-server emits newline-delimited records; payload lines look like
//! `data: {"content":"<fragment>"}`.  TCP reads do not respect line
//! boundaries, so [`LineDecoder`] buffers partial lines across reads.
//! [`ChunkBuffer`] then regroups the tiny per-token fragments into
//! client-sized chunks at natural text boundaries.
//!
//! Wire noise (blank keep-alive lines, malformed JSON, records without a
//! `content` field) is expected and skipped silently; a single bad record
//! must never kill the relay.

/// Prefix marking a payload record.
const DATA_PREFIX: &str = "data: ";

/// End-of-turn sentinel some chat templates leak into the output.
const END_OF_TURN: &str = "<|im_end|>";

/// ANSI reset sequence llama-server occasionally emits.
const ANSI_RESET: &str = "\u{1b}[0m";

/// A fragment ending in one of these is a good place to flush a chunk.
const NATURAL_BOUNDARY: [char; 5] = [' ', '\n', '.', '!', '?'];

/// Accumulates raw bytes and yields complete `\n`-delimited lines.
///
/// Bytes that do not yet form a complete line stay buffered until the next
/// read (or until [`LineDecoder::take_remainder`] at end of stream).  The
/// buffer stays raw bytes: a read may end in the middle of a multi-byte
/// UTF-8 character, so decoding happens per complete line, never per read.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one read's worth of bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    /// Pop the next complete line, without its terminator.  CR before the
    /// LF is stripped so CRLF backends behave identically.  Invalid UTF-8
    /// within a line is replaced rather than erroring; the JSON parse
    /// downstream will reject anything broken.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Drain whatever is left after the final read.  A last record without a
    /// trailing newline still counts.
    pub fn take_remainder(&mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&rest).into_owned()
    }
}

/// Extract the cleaned text fragment from one wire line, if it carries one.
///
/// Returns `None` for anything that is not a well-formed payload record.
pub fn parse_fragment(line: &str) -> Option<String> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let value: serde_json::Value = serde_json::from_str(payload).ok()?;
    let content = value.get("content")?.as_str()?;
    Some(clean_fragment(content))
}

/// Strip backend artifacts that are not semantic content.
fn clean_fragment(raw: &str) -> String {
    raw.replace(END_OF_TURN, "").replace(ANSI_RESET, "")
}

/// Regroups per-token fragments into client-sized chunks.
///
/// Fragments are buffered until one ends at a natural boundary (whitespace
/// or terminal punctuation); the buffer is then flushed whole.  At most one
/// boundary's worth of text is ever held back, keeping latency low while
/// avoiding a write per token.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    buf: String,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cleaned fragment; returns a chunk to forward when the fragment
    /// lands on a natural boundary.
    pub fn push(&mut self, fragment: &str) -> Option<String> {
        self.buf.push_str(fragment);
        if fragment.ends_with(&NATURAL_BOUNDARY[..]) && !self.buf.is_empty() {
            Some(std::mem::take(&mut self.buf))
        } else {
            None
        }
    }

    /// Flush whatever is still buffered at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buf))
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
