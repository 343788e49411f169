mod client;

pub use client::{HttpChatBackend, HttpChatBackendBuilder};
