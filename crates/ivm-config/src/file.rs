//! On-disk configuration format
//!
//! Both `ivm.toml` and `~/.ivm/config.toml` share this schema:
//!
//! ```toml
//! [vm]
//! stack_size = 1000
//! max_call_depth = 1000
//! trace = false
//! ```

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A parsed configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Engine settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm: Option<VmSection>,
}

/// `[vm]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct VmSection {
    /// Operand stack capacity in words
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_size: Option<usize>,

    /// Maximum number of live call frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,

    /// Enable the per-cycle trace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<bool>,
}

impl ConfigFile {
    /// Load a configuration file from disk
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate explicitly set values
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(vm) = &self.vm {
            if vm.stack_size == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "vm.stack_size".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            if vm.max_call_depth == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: "vm.max_call_depth".to_string(),
                    reason: "must allow at least the entry frame".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Engine section, if present
    pub fn vm(&self) -> Option<&VmSection> {
        self.vm.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_section() {
        let config: ConfigFile = toml::from_str(
            r#"
[vm]
stack_size = 256
max_call_depth = 32
trace = true
"#,
        )
        .unwrap();

        let vm = config.vm().unwrap();
        assert_eq!(vm.stack_size, Some(256));
        assert_eq!(vm.max_call_depth, Some(32));
        assert_eq!(vm.trace, Some(true));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str(
            r#"
[vm]
heap_size = 10
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_depth_fails_validation() {
        let config = ConfigFile {
            vm: Some(VmSection {
                max_call_depth: Some(0),
                ..VmSection::default()
            }),
        };
        assert!(config.validate().is_err());
    }
}
