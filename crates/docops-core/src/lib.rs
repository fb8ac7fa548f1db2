//! DocOps Core — shared error type, data directories, configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, DocOpsConfig};
pub use error::{Error, Result};
