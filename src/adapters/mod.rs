//! Adapters - Concrete implementations of ports.

pub mod events;
pub mod fs;
pub mod http;
pub mod process;
