//! Shared test utilities for ivm runtime tests

#![allow(dead_code)]

use ivm_runtime::{FunctionMeta, Opcode, Program, RuntimeError, SharedBuffer, VM};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// Outcome of one run: the VM (for inspection), its result and what it printed
pub struct Run {
    pub vm: VM,
    pub result: Result<(), RuntimeError>,
    pub output: String,
}

/// Run a program from its entry function's address, capturing output
pub fn run_program(program: Program) -> Run {
    let buffer = SharedBuffer::new();
    let start = program.entry_address().unwrap_or(0);
    let mut vm = VM::new(program);
    vm.set_output_writer(buffer.writer());
    let result = vm.run(start);
    Run {
        vm,
        result,
        output: buffer.contents(),
    }
}

/// Program with a single zero-argument `main` at address 0
pub fn main_only(code: Vec<i32>, n_globals: usize) -> Program {
    Program::new(code, n_globals, vec![FunctionMeta::new("main", 0, 0, 0)])
}

/// Assert the run halted cleanly and printed exactly `expected` lines
pub fn assert_prints(program: Program, expected: &[&str]) {
    let run = run_program(program);
    if let Err(e) = &run.result {
        panic!("run failed: {}", e);
    }
    let lines: Vec<&str> = run.output.lines().collect();
    assert_eq!(lines, expected);
}

pub fn op(opcode: Opcode) -> i32 {
    opcode as i32
}
