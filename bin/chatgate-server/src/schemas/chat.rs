//! Chat route request types.
//!
//! The response of `POST /api/ai` is a raw `text/plain` chunk stream, so
//! there is no response struct here.

use serde::{Deserialize, Serialize};

/// A single prior turn in the conversation, as supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// `"user"` or `"assistant"`; anything else is treated as assistant.
    pub role: String,
    /// The content of the turn.
    pub content: String,
}

/// Request body for `POST /api/ai`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new user message.
    pub message: String,
    /// Prior conversation turns, oldest first.  The server never stores
    /// these; each request carries its own context.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}
