//! ivm Configuration System
//!
//! Provides engine configuration for the ivm virtual machine:
//! - Project configuration (ivm.toml)
//! - Global user configuration (~/.ivm/config.toml)
//! - Environment overrides (IVM_*)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config (~/.ivm/config.toml)
//! 3. Project config (./ivm.toml, searched upwards)
//! 4. Environment variables (IVM_*)
//! 5. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use ivm_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("stack size: {}", config.vm.stack_size);
//! ```

pub mod file;
pub mod loader;
pub mod vm;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Name of the per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = "ivm.toml";

// Re-export main types
pub use file::{ConfigFile, VmSection};
pub use loader::{Config, ConfigLoader};
pub use vm::{VmConfig, DEFAULT_MAX_CALL_DEPTH, DEFAULT_STACK_SIZE};
