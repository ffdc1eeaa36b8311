pub mod disasm;
pub mod run;
pub mod sample;

use anyhow::{Context, Result};
use ivm_config::{ConfigLoader, VmConfig};
use ivm_runtime::{Program, VM};
use std::path::Path;
use tracing::debug;

/// Resolve engine settings: config files and environment, then CLI flags
pub fn load_settings(config_path: Option<&Path>, trace: bool) -> Result<VmConfig> {
    let mut loader = ConfigLoader::new();
    let config = match config_path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load configuration")?
        }
    };

    if let Some(root) = config.project_root() {
        debug!(target: "ivm::cli", root = %root.display(), "project config");
    }

    let mut vm = config.vm;
    vm.trace |= trace;
    Ok(vm)
}

/// Execute `program` from `start`, or from the entry function's address
pub fn execute(program: Program, start: Option<usize>, settings: &VmConfig) -> Result<()> {
    let start = match start {
        Some(address) => address,
        None => program
            .entry_address()
            .context("Program has no entry function")?,
    };

    debug!(
        target: "ivm::cli",
        start,
        stack_size = settings.stack_size,
        max_call_depth = settings.max_call_depth,
        trace = settings.trace,
        "executing"
    );

    let mut vm = VM::with_config(program, settings);
    vm.run(start)?;
    Ok(())
}
