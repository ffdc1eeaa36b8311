//! Runtime faults
//!
//! Every fault is fatal: the run that raised it stops at the faulting
//! instruction and the error is returned from [`crate::vm::VM::run`].

use thiserror::Error;

/// Fatal execution fault
///
/// `ip` is always the address of the opcode word of the instruction that
/// faulted.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Opcode word with no Instruction Table entry
    #[error("invalid opcode: {opcode} at ip={ip}")]
    InvalidOpcode { opcode: i32, ip: usize },

    /// Operand words run past the end of code memory
    #[error("truncated instruction: opcode {opcode} at ip={ip} is missing operands")]
    TruncatedInstruction { opcode: i32, ip: usize },

    /// CALL operand outside the function metadata table
    #[error("invalid function index: {index} at ip={ip}")]
    InvalidFunctionIndex { index: i32, ip: usize },

    /// Branch target or entry address outside code memory
    #[error("code address {address} out of bounds at ip={ip}")]
    CodeOutOfBounds { address: i64, ip: usize },

    /// Push onto a full operand stack
    #[error("stack overflow at ip={ip} (capacity {capacity})")]
    StackOverflow { capacity: usize, ip: usize },

    /// Pop from an empty operand stack
    #[error("stack underflow at ip={ip}")]
    StackUnderflow { ip: usize },

    /// LOAD/STORE index outside the active frame
    #[error("local index {index} out of bounds in '{function}' ({len} slots) at ip={ip}")]
    LocalOutOfBounds {
        index: i32,
        len: usize,
        function: String,
        ip: usize,
    },

    /// GLOAD/GSTORE index outside global memory
    #[error("global index {index} out of bounds ({len} globals) at ip={ip}")]
    GlobalOutOfBounds { index: i32, len: usize, ip: usize },

    /// CALL would exceed the configured call depth
    #[error("call stack overflow: depth {depth} exceeds limit at ip={ip}")]
    CallStackOverflow { depth: usize, ip: usize },

    /// RET executed by the outermost frame
    #[error("return from entry function at ip={ip}")]
    ReturnFromEntry { ip: usize },

    /// Engine state used before `run` built the entry frame
    #[error("no active call frame at ip={ip}")]
    NoActiveFrame { ip: usize },

    /// The print channel failed
    #[error("failed to write output at ip={ip}: {source}")]
    Output {
        ip: usize,
        #[source]
        source: std::io::Error,
    },
}

impl RuntimeError {
    /// Address of the faulting instruction
    pub fn ip(&self) -> usize {
        match self {
            RuntimeError::InvalidOpcode { ip, .. }
            | RuntimeError::TruncatedInstruction { ip, .. }
            | RuntimeError::InvalidFunctionIndex { ip, .. }
            | RuntimeError::CodeOutOfBounds { ip, .. }
            | RuntimeError::StackOverflow { ip, .. }
            | RuntimeError::StackUnderflow { ip }
            | RuntimeError::LocalOutOfBounds { ip, .. }
            | RuntimeError::GlobalOutOfBounds { ip, .. }
            | RuntimeError::CallStackOverflow { ip, .. }
            | RuntimeError::ReturnFromEntry { ip }
            | RuntimeError::NoActiveFrame { ip }
            | RuntimeError::Output { ip, .. } => *ip,
        }
    }

    /// True for faults caused by the program text itself (bad opcode,
    /// function index or address) rather than by exhausting a resource.
    pub fn is_malformed_program(&self) -> bool {
        matches!(
            self,
            RuntimeError::InvalidOpcode { .. }
                | RuntimeError::TruncatedInstruction { .. }
                | RuntimeError::InvalidFunctionIndex { .. }
                | RuntimeError::CodeOutOfBounds { .. }
                | RuntimeError::ReturnFromEntry { .. }
        )
    }
}
