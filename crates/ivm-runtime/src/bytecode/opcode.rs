//! Instruction set
//!
//! Eighteen integer opcodes. Each instruction is one opcode word followed by
//! its operand words; value 0 is reserved and never decodes.

/// Bytecode opcode
///
/// Explicit word values; they are part of the program image format.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Arithmetic =====
    /// Pop b, pop a, push a + b
    IAdd = 1,
    /// Pop b, pop a, push a - b
    ISub = 2,
    /// Pop b, pop a, push a * b
    IMul = 3,

    // ===== Comparison =====
    /// Pop b, pop a, push a < b as 1/0
    ILt = 4,
    /// Pop b, pop a, push a == b as 1/0
    IEq = 5,

    // ===== Control flow =====
    /// Jump to absolute address [addr]
    Br = 6,
    /// Pop condition, jump if it is 1 [addr]
    Brt = 7,
    /// Pop condition, jump if it is 0 [addr]
    Brf = 8,

    // ===== Constants =====
    /// Push literal [value]
    IConst = 9,

    // ===== Variables =====
    /// Push local slot [index]
    Load = 10,
    /// Push global slot [index]
    GLoad = 11,
    /// Pop into local slot [index]
    Store = 12,
    /// Pop into global slot [index]
    GStore = 13,

    // ===== Stack =====
    /// Pop and emit on the output channel
    Print = 14,
    /// Pop and discard
    Pop = 15,

    // ===== Functions =====
    /// Call function [function index]
    Call = 16,
    /// Return to the caller's saved address
    Ret = 17,

    // ===== Special =====
    /// Stop execution
    Halt = 18,
}

/// Every opcode, in word-value order
pub const ALL_OPCODES: [Opcode; 18] = [
    Opcode::IAdd,
    Opcode::ISub,
    Opcode::IMul,
    Opcode::ILt,
    Opcode::IEq,
    Opcode::Br,
    Opcode::Brt,
    Opcode::Brf,
    Opcode::IConst,
    Opcode::Load,
    Opcode::GLoad,
    Opcode::Store,
    Opcode::GStore,
    Opcode::Print,
    Opcode::Pop,
    Opcode::Call,
    Opcode::Ret,
    Opcode::Halt,
];

/// Most operand words any instruction carries
pub const MAX_OPERANDS: usize = 2;

impl Opcode {
    /// Mnemonic used by the disassembler and the program image format
    pub const fn name(self) -> &'static str {
        match self {
            Opcode::IAdd => "iadd",
            Opcode::ISub => "isub",
            Opcode::IMul => "imul",
            Opcode::ILt => "ilt",
            Opcode::IEq => "ieq",
            Opcode::Br => "br",
            Opcode::Brt => "brt",
            Opcode::Brf => "brf",
            Opcode::IConst => "iconst",
            Opcode::Load => "load",
            Opcode::GLoad => "gload",
            Opcode::Store => "store",
            Opcode::GStore => "gstore",
            Opcode::Print => "print",
            Opcode::Pop => "pop",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
            Opcode::Halt => "halt",
        }
    }

    /// Number of operand words following the opcode
    pub const fn operand_count(self) -> usize {
        match self {
            Opcode::Br
            | Opcode::Brt
            | Opcode::Brf
            | Opcode::IConst
            | Opcode::Load
            | Opcode::GLoad
            | Opcode::Store
            | Opcode::GStore
            | Opcode::Call => 1,
            _ => 0,
        }
    }

    /// Look up an opcode by mnemonic (case-insensitive)
    pub fn from_name(name: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<i32> for Opcode {
    type Error = ();

    fn try_from(word: i32) -> Result<Self, Self::Error> {
        crate::vm::dispatch::decode_opcode(word).ok_or(())
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
