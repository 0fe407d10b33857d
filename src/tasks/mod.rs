//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: Removes expired validators at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
