pub mod chat_client;
pub mod composer;
pub mod models;
pub mod session;
