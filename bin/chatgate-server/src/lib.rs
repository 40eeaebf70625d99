//! chatgate-server – streaming chat proxy gateway.
//!
//! Sits between browser clients and a local llama-server style inference
//! backend: authenticates users, composes a role-tagged prompt from the
//! request body, forwards it to the backend's streaming `/completion`
//! endpoint, and relays cleaned text chunks back to the client as they are
//! generated.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod prompt;
pub mod relay;
pub mod routes;
pub mod schemas;
pub mod state;
