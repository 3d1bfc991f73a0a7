//! Ports - Trait definitions the application layer depends on.

pub mod storage;
pub mod upload;
pub mod watch;
