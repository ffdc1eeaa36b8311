//! ivm Runtime - integer bytecode virtual machine
//!
//! This library provides:
//! - The instruction set and its decoder
//! - The function metadata table consulted by CALL
//! - Call frames and the fetch-decode-execute engine
//! - A disassembler, trace hooks and JSON program images
//!
//! # Example
//!
//! ```
//! use ivm_runtime::{samples, SharedBuffer, VM};
//!
//! let out = SharedBuffer::new();
//! let mut vm = VM::new(samples::factorial(5));
//! vm.set_output_writer(out.writer());
//! vm.run(21).unwrap();
//! assert_eq!(out.contents(), "120\n");
//! ```

/// ivm runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod bytecode;
pub mod error;
pub mod function;
pub mod output;
pub mod samples;
pub mod vm;

// Re-export commonly used types
pub use bytecode::{disasm, ImageError, Instruction, Opcode, Program};
pub use error::RuntimeError;
pub use function::{FunctionMeta, FunctionTable};
pub use ivm_config::VmConfig;
pub use output::{OutputWriter, SharedBuffer};
pub use vm::{CallFrame, LogTracer, TraceHook, WriterTracer, VM};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert_eq!(VERSION, "0.1.0");
    }
}
