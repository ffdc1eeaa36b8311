//! Sample command - built-in demonstration programs

use anyhow::{anyhow, Result};
use ivm_config::VmConfig;
use ivm_runtime::{samples, Program};

fn resolve(name: &str, arg: Option<i32>) -> Result<Program> {
    samples::by_name(name, arg).ok_or_else(|| {
        anyhow!(
            "Unknown sample '{}' (expected one of: {})",
            name,
            samples::NAMES.join(", ")
        )
    })
}

/// Run a sample from its entry function
pub fn run(name: &str, arg: Option<i32>, settings: &VmConfig) -> Result<()> {
    let program = resolve(name, arg)?;
    super::execute(program, None, settings)
}

/// Print a sample as a JSON program image
pub fn emit(name: &str, arg: Option<i32>) -> Result<()> {
    let program = resolve(name, arg)?;
    println!("{}", program.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sample_lists_names() {
        let err = resolve("fib", None).unwrap_err().to_string();
        assert!(err.contains("fib"));
        assert!(err.contains("hello, loop, factorial, call"));
    }
}
