pub mod client;

pub use client::{AiFailure, ChatBackend, OpenAiChatClient};
