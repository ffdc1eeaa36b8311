//! Run command - execute a JSON program image

use anyhow::{Context, Result};
use ivm_config::VmConfig;
use ivm_runtime::Program;
use std::fs;
use std::path::Path;

/// Load a program image from disk
pub fn load_image(path: &Path) -> Result<Program> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read program image: {}", path.display()))?;
    Program::from_json(&source)
        .with_context(|| format!("Invalid program image: {}", path.display()))
}

/// Run the image at `path`
pub fn run(path: &Path, start: Option<usize>, settings: &VmConfig) -> Result<()> {
    let program = load_image(path)?;
    super::execute(program, start, settings)
}
