//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::file::ConfigFile;
use crate::vm::VmConfig;
use crate::{ConfigError, ConfigResult, PROJECT_CONFIG_FILE};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.ivm/config.toml) - lowest priority
/// 2. Project config (./ivm.toml) - overrides global
/// 3. Environment variables (IVM_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Resolved engine settings
    pub vm: VmConfig,

    /// Directory where ivm.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config path instead of ~/.ivm/config.toml
    pub fn with_global_config_path(path: PathBuf) -> Self {
        Self {
            global_config_path: Some(path),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find ivm.toml, layering it over the
    /// global config and applying environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let mut vm = self.global_vm_config()?;

        let (project_root, project_config) = Self::find_project_config(start_dir)?;
        if let Some(section) = project_config.vm() {
            vm.merge(section);
        }

        let vm = Self::apply_env_overrides(vm)?;
        vm.validate()?;

        Ok(Config { vm, project_root })
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let mut vm = self.global_vm_config()?;

        let file = ConfigFile::load_from_file(config_path)?;
        if let Some(section) = file.vm() {
            vm.merge(section);
        }

        let vm = Self::apply_env_overrides(vm)?;
        vm.validate()?;

        Ok(Config {
            vm,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(start_dir: &Path) -> ConfigResult<(Option<PathBuf>, ConfigFile)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let config = ConfigFile::load_from_file(&config_path)?;
                return Ok((Some(current), config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ConfigFile::default())),
            }
        }
    }

    /// Defaults overlaid with the global config, if one exists
    fn global_vm_config(&mut self) -> ConfigResult<VmConfig> {
        let mut vm = VmConfig::default();
        if let Some(global) = self.load_global_config()? {
            if let Some(section) = global.vm() {
                vm.merge(section);
            }
        }
        Ok(vm)
    }

    /// Load global configuration from ~/.ivm/config.toml
    ///
    /// A missing file or missing home directory is not an error.
    fn load_global_config(&mut self) -> ConfigResult<Option<ConfigFile>> {
        if self.global_config_path.is_none() {
            match Self::global_config_dir() {
                Ok(dir) => self.global_config_path = Some(dir.join("config.toml")),
                Err(ConfigError::HomeNotFound) => return Ok(None),
                Err(e) => return Err(e),
            }
        }

        match self.global_config_path.as_deref() {
            Some(path) if path.exists() => ConfigFile::load_from_file(path).map(Some),
            _ => Ok(None),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Recognised: IVM_STACK_SIZE, IVM_MAX_CALL_DEPTH, IVM_TRACE
    fn apply_env_overrides(mut config: VmConfig) -> ConfigResult<VmConfig> {
        if let Ok(value) = env::var("IVM_STACK_SIZE") {
            config.stack_size = parse_usize("IVM_STACK_SIZE", &value)?;
        }

        if let Ok(value) = env::var("IVM_MAX_CALL_DEPTH") {
            config.max_call_depth = parse_usize("IVM_MAX_CALL_DEPTH", &value)?;
        }

        if let Ok(trace) = env::var("IVM_TRACE") {
            config.trace = matches!(trace.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        Ok(config)
    }

    /// Get the global configuration directory (~/.ivm)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".ivm"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Check if an ivm.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }
}

fn parse_usize(field: &str, value: &str) -> ConfigResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a non-negative integer, got '{}'", value),
        })
}
