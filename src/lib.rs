//! Blurhash Server - blurhash signatures for remote images over HTTP
//!
//! Every response passes through a conditional-caching layer: a fixed
//! Cache-Control directive plus ETag validators remembered in an in-memory
//! store with TTL expiration and LRU eviction.

pub mod api;
pub mod cache;
pub mod caching;
pub mod config;
pub mod error;
pub mod imaging;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
