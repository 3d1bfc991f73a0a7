//! Domain layer - Pure logic with no I/O beyond writing the master manifest.

pub mod hls;
pub mod layout;
pub mod transcode;
