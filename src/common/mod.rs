//! Common utilities shared by the CLI and the harness pipeline

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::Config;
pub use error::{Error, Result};
