//! Stack-based virtual machine
//!
//! Executes integer bytecode with a fixed-capacity operand stack, a linked
//! chain of call frames and a flat global memory.
//! - All values are `i32`; arithmetic wraps on overflow
//! - Comparisons push 1 for true and 0 for false
//! - Every bounds violation is a fatal [`RuntimeError`]

pub mod dispatch;
mod frame;
mod hook;

pub use frame::CallFrame;
pub use hook::{format_calls, format_stack, LogTracer, TraceHook, WriterTracer};

use crate::bytecode::{disasm, Instruction, Opcode, Program};
use crate::error::RuntimeError;
use crate::output::{stdout_writer, OutputWriter};
use ivm_config::VmConfig;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, trace};

/// Value pushed by comparisons that hold
pub const TRUE: i32 = 1;
/// Value pushed by comparisons that fail
pub const FALSE: i32 = 0;

/// Virtual machine state
pub struct VM {
    /// Code memory, global size and function table
    program: Program,
    /// Global memory
    globals: Vec<i32>,
    /// Operand stack; never grows past `stack_capacity`
    stack: Vec<i32>,
    stack_capacity: usize,
    /// Innermost call frame; owns the rest of the chain
    frame: Option<Box<CallFrame>>,
    /// Number of frames in the chain
    frame_depth: usize,
    max_call_depth: usize,
    /// Instruction pointer
    ip: usize,
    /// Address of the instruction currently executing (reported on fault)
    instruction_ip: usize,
    /// Instructions executed by the current run
    cycles: u64,
    /// Optional per-cycle observer
    trace_hook: Option<Box<dyn TraceHook>>,
    /// Destination of PRINT (defaults to stdout)
    output_writer: OutputWriter,
}

impl VM {
    /// Create a new VM with default capacities
    pub fn new(program: Program) -> Self {
        Self::with_config(program, &VmConfig::default())
    }

    /// Create a new VM with capacities and tracing taken from `config`
    pub fn with_config(program: Program, config: &VmConfig) -> Self {
        let mut vm = Self {
            globals: vec![0; program.n_globals],
            stack: Vec::new(),
            stack_capacity: config.stack_size,
            frame: None,
            frame_depth: 0,
            max_call_depth: config.max_call_depth,
            ip: 0,
            instruction_ip: 0,
            cycles: 0,
            trace_hook: None,
            output_writer: stdout_writer(),
            program,
        };
        vm.set_trace(config.trace);
        vm
    }

    /// Set the output writer (used to capture PRINT output)
    pub fn set_output_writer(&mut self, writer: OutputWriter) {
        self.output_writer = writer;
    }

    /// Enable or disable the stderr trace
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace_hook = if enabled {
            Some(Box::new(WriterTracer::stderr()))
        } else {
            None
        };
    }

    /// Install a custom trace hook
    pub fn set_trace_hook(&mut self, hook: Box<dyn TraceHook>) {
        self.trace_hook = Some(hook);
    }

    /// Remove and return the installed trace hook
    pub fn take_trace_hook(&mut self) -> Option<Box<dyn TraceHook>> {
        self.trace_hook.take()
    }

    /// Execute from `start_address` with a fresh entry frame for function 0
    ///
    /// Runs until HALT, until the instruction pointer reaches the end of
    /// code memory, or until a fault. Engine state is reset first, so a VM
    /// may be run again after a fault.
    pub fn run(&mut self, start_address: usize) -> Result<(), RuntimeError> {
        self.reset();
        self.ip = start_address;
        self.instruction_ip = start_address;

        debug!(
            target: "ivm::vm",
            start_address,
            code_len = self.program.code.len(),
            functions = self.program.functions.len(),
            "run"
        );

        let result = self.enter_main().and_then(|()| self.execute_loop());
        let flushed = self.output_writer.flush().map_err(|source| RuntimeError::Output {
            ip: self.instruction_ip,
            source,
        });
        let result = result.and_then(|()| flushed);

        match &result {
            Ok(()) => debug!(target: "ivm::vm", cycles = self.cycles, "halted"),
            Err(e) => debug!(target: "ivm::vm", cycles = self.cycles, error = %e, "aborted"),
        }
        result
    }

    /// Clear the stack, zero globals and drop every frame
    pub fn reset(&mut self) {
        self.stack.clear();
        self.globals.iter_mut().for_each(|g| *g = 0);
        self.frame = None;
        self.frame_depth = 0;
        self.ip = 0;
        self.instruction_ip = 0;
        self.cycles = 0;
    }

    fn enter_main(&mut self) -> Result<(), RuntimeError> {
        let ip = self.ip;
        let main = Arc::clone(self.program.functions.get(0, ip)?);
        self.code_address(ip as i64)?;
        self.frame = Some(Box::new(CallFrame::new(None, 0, main, &[])));
        self.frame_depth = 1;
        Ok(())
    }

    /// Fetch-decode-execute cycle
    fn execute_loop(&mut self) -> Result<(), RuntimeError> {
        loop {
            // Running off the end of code memory is an implicit halt
            if self.ip >= self.program.code.len() {
                self.finish(None);
                return Ok(());
            }

            self.instruction_ip = self.ip;
            let instruction = dispatch::decode_instruction(&self.program.code, self.ip)?;

            if instruction.opcode == Opcode::Halt {
                self.finish(Some(&instruction));
                return Ok(());
            }

            if let Some(hook) = self.trace_hook.as_mut() {
                hook.before_instruction(&instruction, &self.program.functions);
            }

            self.ip = instruction.next_ip();
            self.cycles += 1;
            self.execute(&instruction)?;

            if let Some(hook) = self.trace_hook.as_mut() {
                let calls = frame::chain_names(self.frame.as_deref());
                hook.after_instruction(&self.stack, &calls);
            }
        }
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<(), RuntimeError> {
        let operand = instruction.operand();

        match instruction.opcode {
            // ===== Arithmetic =====
            Opcode::IAdd => self.binary_op(i32::wrapping_add)?,
            Opcode::ISub => self.binary_op(i32::wrapping_sub)?,
            Opcode::IMul => self.binary_op(i32::wrapping_mul)?,

            // ===== Comparison =====
            Opcode::ILt => self.binary_op(|a, b| if a < b { TRUE } else { FALSE })?,
            Opcode::IEq => self.binary_op(|a, b| if a == b { TRUE } else { FALSE })?,

            // ===== Control flow =====
            Opcode::Br => {
                self.ip = self.code_address(operand as i64)?;
            }
            // The target is only checked when the branch is taken
            Opcode::Brt => {
                if self.pop()? == TRUE {
                    self.ip = self.code_address(operand as i64)?;
                }
            }
            Opcode::Brf => {
                if self.pop()? == FALSE {
                    self.ip = self.code_address(operand as i64)?;
                }
            }

            // ===== Constants =====
            Opcode::IConst => self.push(operand)?,

            // ===== Variables =====
            Opcode::Load => {
                let ip = self.instruction_ip;
                let value = self.active_frame()?.load(operand, ip)?;
                self.push(value)?;
            }
            Opcode::Store => {
                let ip = self.instruction_ip;
                let value = self.pop()?;
                self.active_frame_mut()?.store(operand, value, ip)?;
            }
            Opcode::GLoad => {
                let slot = self.global_slot(operand)?;
                self.push(self.globals[slot])?;
            }
            Opcode::GStore => {
                let slot = self.global_slot(operand)?;
                self.globals[slot] = self.pop()?;
            }

            // ===== Stack =====
            Opcode::Print => {
                let ip = self.instruction_ip;
                let value = self.pop()?;
                writeln!(self.output_writer, "{}", value)
                    .map_err(|source| RuntimeError::Output { ip, source })?;
            }
            Opcode::Pop => {
                self.pop()?;
            }

            // ===== Functions =====
            Opcode::Call => self.call(operand)?,
            Opcode::Ret => self.ret()?,

            // Stops the loop before dispatch
            Opcode::Halt => {}
        }

        Ok(())
    }

    /// Push a frame for function `index` and jump to its entry
    ///
    /// The top `arg_count` stack values become the callee's first locals,
    /// in push order. The address after the operand is saved for RET.
    fn call(&mut self, index: i32) -> Result<(), RuntimeError> {
        let ip = self.instruction_ip;
        let function = Arc::clone(self.program.functions.get(index, ip)?);

        if self.frame_depth >= self.max_call_depth {
            return Err(RuntimeError::CallStackOverflow {
                depth: self.frame_depth + 1,
                ip,
            });
        }
        let entry = self.code_address(function.address as i64)?;

        let arg_count = function.arg_count;
        if self.stack.len() < arg_count {
            return Err(RuntimeError::StackUnderflow { ip });
        }
        let first_arg = self.stack.len() - arg_count;

        trace!(
            target: "ivm::vm",
            function = %function.name,
            depth = self.frame_depth + 1,
            return_ip = self.ip,
            "call"
        );

        let caller = self.frame.take();
        let frame = CallFrame::new(caller, self.ip, function, &self.stack[first_arg..]);
        self.stack.truncate(first_arg);

        self.frame = Some(Box::new(frame));
        self.frame_depth += 1;
        self.ip = entry;
        Ok(())
    }

    /// Pop the active frame and resume at its saved return address
    ///
    /// The operand stack is left untouched; a callee leaves its result there.
    fn ret(&mut self) -> Result<(), RuntimeError> {
        let ip = self.instruction_ip;
        let frame = self.frame.take().ok_or(RuntimeError::NoActiveFrame { ip })?;

        if frame.caller().is_none() {
            self.frame = Some(frame);
            return Err(RuntimeError::ReturnFromEntry { ip });
        }

        trace!(
            target: "ivm::vm",
            function = %frame.function().name,
            return_ip = frame.return_ip(),
            "return"
        );

        self.ip = frame.return_ip();
        self.frame = (*frame).into_caller();
        self.frame_depth -= 1;
        Ok(())
    }

    /// Called when the loop stops without a fault
    fn finish(&mut self, instruction: Option<&Instruction>) {
        if let Some(hook) = self.trace_hook.as_mut() {
            hook.on_halt(
                instruction,
                &self.program.functions,
                &self.stack,
                &self.globals,
            );
        }
    }

    // ===== Helper Methods =====

    #[inline(always)]
    fn push(&mut self, value: i32) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.stack_capacity {
            return Err(RuntimeError::StackOverflow {
                capacity: self.stack_capacity,
                ip: self.instruction_ip,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    #[inline(always)]
    fn pop(&mut self) -> Result<i32, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow {
            ip: self.instruction_ip,
        })
    }

    /// Pop b, pop a, push op(a, b)
    #[inline(always)]
    fn binary_op<F>(&mut self, op: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(i32, i32) -> i32,
    {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(op(a, b))
    }

    /// Validate a branch target or entry address.
    /// `code.len()` itself is allowed: execution halts there.
    fn code_address(&self, address: i64) -> Result<usize, RuntimeError> {
        usize::try_from(address)
            .ok()
            .filter(|addr| *addr <= self.program.code.len())
            .ok_or(RuntimeError::CodeOutOfBounds {
                address,
                ip: self.instruction_ip,
            })
    }

    fn global_slot(&self, index: i32) -> Result<usize, RuntimeError> {
        usize::try_from(index)
            .ok()
            .filter(|slot| *slot < self.globals.len())
            .ok_or(RuntimeError::GlobalOutOfBounds {
                index,
                len: self.globals.len(),
                ip: self.instruction_ip,
            })
    }

    fn active_frame(&self) -> Result<&CallFrame, RuntimeError> {
        self.frame.as_deref().ok_or(RuntimeError::NoActiveFrame {
            ip: self.instruction_ip,
        })
    }

    fn active_frame_mut(&mut self) -> Result<&mut CallFrame, RuntimeError> {
        let ip = self.instruction_ip;
        self.frame
            .as_deref_mut()
            .ok_or(RuntimeError::NoActiveFrame { ip })
    }

    // ── Inspection API ───────────────────────────────────────────────────────

    /// Get the current instruction pointer.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Operand stack contents, bottom first.
    pub fn stack(&self) -> &[i32] {
        &self.stack
    }

    /// Global memory.
    pub fn globals(&self) -> &[i32] {
        &self.globals
    }

    /// Number of live frames (1 while only the entry function runs).
    pub fn frame_depth(&self) -> usize {
        self.frame_depth
    }

    /// Innermost frame, if a run has started.
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.frame.as_deref()
    }

    /// Function names of the live frames, entry function first.
    pub fn call_chain(&self) -> Vec<&str> {
        frame::chain_names(self.frame.as_deref())
    }

    /// Instructions executed by the last run (HALT excluded).
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn dump_data_memory(&self) -> String {
        disasm::dump_data_memory(&self.globals)
    }

    pub fn dump_code_memory(&self) -> String {
        disasm::dump_code_memory(&self.program.code)
    }
}

impl std::fmt::Debug for VM {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VM")
            .field("ip", &self.ip)
            .field("stack", &self.stack)
            .field("globals", &self.globals)
            .field("frame_depth", &self.frame_depth)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}
