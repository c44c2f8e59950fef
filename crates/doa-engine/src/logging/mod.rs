//! Logging utilities.
//!
//! Centralizes logger initialization. Engine code only uses the `log` facade;
//! `env_logger` is installed here for binaries and for the C ABI, whose hosts
//! never install a Rust logger themselves.

mod init;

pub use init::{init_logging, LoggingConfig};
