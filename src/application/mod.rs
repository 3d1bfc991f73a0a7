//! Application layer - Services that drive the ports.

pub mod bootstrap;
pub mod pipeline;
pub mod runner;
pub mod shutdown;
