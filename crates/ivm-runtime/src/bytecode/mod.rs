//! Bytecode program container
//!
//! Code memory is a flat sequence of `i32` words: an opcode word followed by
//! its operand words, with no padding. A program also carries the size of
//! global memory and the function metadata table that CALL indexes into.

pub mod disasm;
mod image;
mod opcode;

pub use image::ImageError;
pub use opcode::{Opcode, ALL_OPCODES, MAX_OPERANDS};

use crate::function::{FunctionMeta, FunctionTable};

/// Bytecode container
///
/// Treated as read-only once handed to the VM.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Word-addressable code memory
    pub code: Vec<i32>,
    /// Number of global memory slots
    pub n_globals: usize,
    /// Function metadata table; index 0 is the entry function
    pub functions: FunctionTable,
}

impl Program {
    /// Create a program from its parts
    pub fn new(code: Vec<i32>, n_globals: usize, functions: Vec<FunctionMeta>) -> Self {
        Self {
            code,
            n_globals,
            functions: FunctionTable::new(functions),
        }
    }

    /// Emit an opcode word
    pub fn emit(&mut self, opcode: Opcode) {
        self.code.push(opcode as i32);
    }

    /// Emit an opcode followed by a single operand word
    pub fn emit_with(&mut self, opcode: Opcode, operand: i32) {
        self.code.push(opcode as i32);
        self.code.push(operand);
    }

    /// Emit a raw word
    pub fn emit_word(&mut self, word: i32) {
        self.code.push(word);
    }

    /// Get current code offset (for branch targets)
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Overwrite the word at `offset`
    ///
    /// Used for forward branches where the target isn't known yet.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not below [`Program::current_offset`].
    pub fn patch(&mut self, offset: usize, word: i32) {
        self.code[offset] = word;
    }

    /// Entry address of function 0, if the table is non-empty
    pub fn entry_address(&self) -> Option<usize> {
        self.functions.entry().map(|f| f.address)
    }
}

/// One decoded instruction: opcode plus its operand words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the opcode word
    pub ip: usize,
    /// Decoded opcode
    pub opcode: Opcode,
    operands: [i32; MAX_OPERANDS],
}

impl Instruction {
    pub(crate) fn new(ip: usize, opcode: Opcode, operands: [i32; MAX_OPERANDS]) -> Self {
        Self {
            ip,
            opcode,
            operands,
        }
    }

    /// Operand words, exactly `opcode.operand_count()` of them
    pub fn operands(&self) -> &[i32] {
        &self.operands[..self.opcode.operand_count()]
    }

    /// First operand word (0 when the opcode takes none)
    pub fn operand(&self) -> i32 {
        self.operands[0]
    }

    /// Address of the following instruction
    pub fn next_ip(&self) -> usize {
        self.ip + 1 + self.opcode.operand_count()
    }
}
