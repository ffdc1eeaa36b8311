//! Bytecode disassembler
//!
//! Converts code memory back to human-readable assembly-like text.
//! Used by the trace hooks and `ivm disasm`.

use super::{Instruction, Opcode, Program};
use crate::error::RuntimeError;
use crate::function::FunctionTable;
use crate::vm::dispatch::decode_instruction;
use std::fmt::Write;

/// Render one instruction in trace format
///
/// `"{ip:04}:\t{name:<11}"` followed by the operands separated by `", "`,
/// or by the callee's name for `call`.
pub fn format_instruction(instruction: &Instruction, functions: &FunctionTable) -> String {
    let mut buf = format!("{:04}:\t{:<11}", instruction.ip, instruction.opcode.name());
    buf.push_str(&operand_text(instruction, functions));
    buf
}

fn operand_text(instruction: &Instruction, functions: &FunctionTable) -> String {
    if instruction.opcode == Opcode::Call {
        if let Some(function) = functions.lookup(instruction.operand()) {
            return function.name.clone();
        }
    }
    instruction
        .operands()
        .iter()
        .map(|operand| operand.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Disassemble a whole program
///
/// # Format
/// ```text
/// 0000  iconst 5
/// 0002  call factorial
/// 0004  print
/// 0005  halt
/// ```
///
/// Words that do not decode are listed as `<invalid opcode: N>` and skipped
/// one at a time.
pub fn disassemble(program: &Program) -> String {
    let mut output = String::new();
    let mut offset = 0;

    while offset < program.code.len() {
        match decode_instruction(&program.code, offset) {
            Ok(instruction) => {
                let operands = operand_text(&instruction, &program.functions);
                let line = format!("{:04}  {} {}", offset, instruction.opcode.name(), operands);
                let _ = writeln!(output, "{}", line.trim_end());
                offset = instruction.next_ip();
            }
            Err(RuntimeError::TruncatedInstruction { opcode, .. }) => {
                let _ = writeln!(output, "{:04}  <truncated: {}>", offset, opcode);
                break;
            }
            Err(_) => {
                let _ = writeln!(
                    output,
                    "{:04}  <invalid opcode: {}>",
                    offset, program.code[offset]
                );
                offset += 1;
            }
        }
    }

    output
}

/// Raw code words, one per line
pub fn dump_code_memory(code: &[i32]) -> String {
    dump_words("Code memory:", code)
}

/// Raw global memory words, one per line
pub fn dump_data_memory(globals: &[i32]) -> String {
    dump_words("Data memory:", globals)
}

fn dump_words(title: &str, words: &[i32]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", title);
    for (addr, word) in words.iter().enumerate() {
        let _ = writeln!(output, "{:04}: {}", addr, word);
    }
    output.push('\n');
    output
}
