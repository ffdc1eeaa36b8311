//! Disasm command - print a listing of a program image

use anyhow::Result;
use ivm_runtime::disasm;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let program = super::run::load_image(path)?;
    print!("{}", disasm::disassemble(&program));
    Ok(())
}
