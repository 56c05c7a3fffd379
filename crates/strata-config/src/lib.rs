//! Configuration for Strata tools.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{ChunkConfig, Config, DebugConfig, DeflateConfig, ThresholdMode};
pub use error::ConfigError;
