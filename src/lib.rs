//! hls-push - Live HLS packaging and push-origin upload
//!
//! An external transcoder writes one HLS rendition per subdirectory of the
//! working directory. Every segment it writes is pushed to the origin,
//! followed by that rendition's playlist, and then removed locally. The
//! master playlist is assembled and pushed once at startup.
//!
//! Hexagonal Architecture:
//! - domain/: Pure logic (master playlist, push layout, transcoder arguments)
//! - ports/: Trait definitions (upload, local storage, directory watching)
//! - adapters/: Concrete implementations (reqwest, tokio fs, notify, child process)
//! - application/: Bootstrap, upload pipeline, shutdown coordination
//! - config: Session configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use application::runner::{run, Pipeline};
pub use application::shutdown::ShutdownReason;
pub use config::{Configuration, PushHost, Rendition};
pub use error::PipelineError;
