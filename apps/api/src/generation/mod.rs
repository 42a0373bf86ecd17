// Generation: one request to the remote service per call; the result replaces
// the session's document.

pub mod client;
pub mod handlers;

pub use client::{GenerationClient, GenerationError, ResumeGenerator, ResumePayload};
