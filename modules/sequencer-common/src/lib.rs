pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, PropertyNames};
pub use error::{ConfigError, SequencerError};
pub use types::*;
