//! Pigeon - Sending mails over HTTP
//!
//! A thin relay: JSON requests in, themed HTML mail out through one of a
//! set of configured SMTP services.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod mail;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SendError};
