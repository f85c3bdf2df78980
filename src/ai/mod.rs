//! Text generation API integration

pub mod client;

// Re-export main types for convenience
pub use client::{ChatReply, ChatRequest, HttpTransport, Transport, interpret_reply};
