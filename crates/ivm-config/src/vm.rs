//! Resolved engine settings

use crate::file::VmSection;
use crate::{ConfigError, ConfigResult};

/// Default operand stack capacity, in words
pub const DEFAULT_STACK_SIZE: usize = 1000;

/// Default maximum number of live call frames
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Fully resolved settings consumed by the execution engine.
///
/// Every field has a value; optional file sections are folded in with
/// [`VmConfig::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Operand stack capacity in words
    pub stack_size: usize,
    /// Maximum call depth, counting the entry frame
    pub max_call_depth: usize,
    /// Emit the per-cycle trace on stderr
    pub trace: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace: false,
        }
    }
}

impl VmConfig {
    /// Overlay the fields present in a file section
    pub fn merge(&mut self, section: &VmSection) {
        if let Some(stack_size) = section.stack_size {
            self.stack_size = stack_size;
        }
        if let Some(max_call_depth) = section.max_call_depth {
            self.max_call_depth = max_call_depth;
        }
        if let Some(trace) = section.trace {
            self.trace = trace;
        }
    }

    /// Reject capacities the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.stack_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "vm.stack_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_call_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "vm.max_call_depth".to_string(),
                reason: "must allow at least the entry frame".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = VmConfig::default();
        assert_eq!(config.stack_size, 1000);
        assert_eq!(config.max_call_depth, 1000);
        assert!(!config.trace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_only_overrides_present_fields() {
        let mut config = VmConfig::default();
        config.merge(&VmSection {
            stack_size: Some(64),
            max_call_depth: None,
            trace: Some(true),
        });

        assert_eq!(config.stack_size, 64);
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert!(config.trace);
    }

    #[test]
    fn test_zero_stack_is_rejected() {
        let config = VmConfig {
            stack_size: 0,
            ..VmConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("vm.stack_size"));
    }

    #[test]
    fn test_zero_call_depth_is_rejected() {
        let config = VmConfig {
            max_call_depth: 0,
            ..VmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
