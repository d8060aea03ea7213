pub mod backend;
pub mod config;
pub mod core;
pub mod event_loop;
pub mod feed_listener;
pub mod ffi;
pub mod logging;
pub mod models;
pub mod photo;
pub mod storage;
