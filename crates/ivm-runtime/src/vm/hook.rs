//! Execution trace hooks
//!
//! Hooks observe the fetch-decode-execute cycle and never influence it:
//! they only receive shared borrows of engine state.

use crate::bytecode::disasm::{dump_data_memory, format_instruction};
use crate::bytecode::Instruction;
use crate::function::FunctionTable;
use std::io::{self, Write};

/// Observer for the fetch-decode-execute cycle
pub trait TraceHook: Send {
    /// Called once per cycle after decoding, before the instruction runs
    fn before_instruction(&mut self, instruction: &Instruction, functions: &FunctionTable);

    /// Called once per cycle after the instruction ran.
    /// `calls` lists function names from the entry frame inward.
    fn after_instruction(&mut self, stack: &[i32], calls: &[&str]);

    /// Called when execution stops normally. `instruction` is the HALT that
    /// stopped it, or None when the instruction pointer ran off the end.
    fn on_halt(
        &mut self,
        instruction: Option<&Instruction>,
        functions: &FunctionTable,
        stack: &[i32],
        globals: &[i32],
    ) {
        let _ = (instruction, functions, stack, globals);
    }
}

/// `stack=[ 1 2 ]`
pub fn format_stack(stack: &[i32]) -> String {
    let mut buf = String::from("stack=[");
    for value in stack {
        buf.push(' ');
        buf.push_str(&value.to_string());
    }
    buf.push_str(" ]");
    buf
}

/// `calls=[main, f]`
pub fn format_calls(calls: &[&str]) -> String {
    format!("calls=[{}]", calls.join(", "))
}

/// Columnar text trace, one line per cycle
///
/// ```text
/// 0000:	iconst     1              stack=[ 1 ]            calls=[main]
/// ```
///
/// Write failures are ignored; tracing never aborts a run.
pub struct WriterTracer<W: Write + Send> {
    out: W,
}

impl WriterTracer<io::Stderr> {
    /// Trace to the process's stderr
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> WriterTracer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TraceHook for WriterTracer<W> {
    fn before_instruction(&mut self, instruction: &Instruction, functions: &FunctionTable) {
        let _ = write!(
            self.out,
            "{:<35}",
            format_instruction(instruction, functions)
        );
    }

    fn after_instruction(&mut self, stack: &[i32], calls: &[&str]) {
        let _ = writeln!(
            self.out,
            "{:<22} {}",
            format_stack(stack),
            format_calls(calls)
        );
    }

    fn on_halt(
        &mut self,
        instruction: Option<&Instruction>,
        functions: &FunctionTable,
        stack: &[i32],
        globals: &[i32],
    ) {
        if let Some(instruction) = instruction {
            let _ = write!(
                self.out,
                "{:<35}",
                format_instruction(instruction, functions)
            );
        }
        let _ = writeln!(self.out, "{}", format_stack(stack));
        let _ = write!(self.out, "{}", dump_data_memory(globals));
        let _ = self.out.flush();
    }
}

/// Trace through `tracing` events at TRACE level, target `ivm::trace`
#[derive(Debug, Default)]
pub struct LogTracer;

impl TraceHook for LogTracer {
    fn before_instruction(&mut self, instruction: &Instruction, functions: &FunctionTable) {
        tracing::trace!(
            target: "ivm::trace",
            ip = instruction.ip,
            instruction = %format_instruction(instruction, functions),
            "decode"
        );
    }

    fn after_instruction(&mut self, stack: &[i32], calls: &[&str]) {
        tracing::trace!(
            target: "ivm::trace",
            stack = %format_stack(stack),
            calls = %format_calls(calls),
            "execute"
        );
    }

    fn on_halt(
        &mut self,
        instruction: Option<&Instruction>,
        _functions: &FunctionTable,
        stack: &[i32],
        globals: &[i32],
    ) {
        tracing::trace!(
            target: "ivm::trace",
            ip = ?instruction.map(|i| i.ip),
            stack = %format_stack(stack),
            globals = ?globals,
            "halt"
        );
    }
}
