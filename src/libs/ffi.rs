//! uniffi surface used by the Android app.

pub mod bridge;
pub mod chat_core;
pub mod models;

pub use chat_core::FriendlyChatCore;
