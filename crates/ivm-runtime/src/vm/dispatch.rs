//! Instruction decoding for the VM
//!
//! Uses a static lookup table indexed by opcode word for O(1) decoding,
//! then reads the fixed number of operand words that follow.

use crate::bytecode::{Instruction, Opcode, MAX_OPERANDS};
use crate::error::RuntimeError;

/// Static dispatch table mapping word values to optional Opcodes.
/// Slot 0 is the reserved invalid opcode.
static OPCODE_TABLE: [Option<Opcode>; 19] = [
    None,
    Some(Opcode::IAdd),
    Some(Opcode::ISub),
    Some(Opcode::IMul),
    Some(Opcode::ILt),
    Some(Opcode::IEq),
    Some(Opcode::Br),
    Some(Opcode::Brt),
    Some(Opcode::Brf),
    Some(Opcode::IConst),
    Some(Opcode::Load),
    Some(Opcode::GLoad),
    Some(Opcode::Store),
    Some(Opcode::GStore),
    Some(Opcode::Print),
    Some(Opcode::Pop),
    Some(Opcode::Call),
    Some(Opcode::Ret),
    Some(Opcode::Halt),
];

/// Decode an opcode word using the static lookup table.
/// Returns None for invalid opcode words.
#[inline(always)]
pub fn decode_opcode(word: i32) -> Option<Opcode> {
    usize::try_from(word)
        .ok()
        .and_then(|index| OPCODE_TABLE.get(index).copied().flatten())
}

/// Decode the instruction starting at `ip`, operands included.
///
/// The caller guarantees `ip < code.len()`.
pub fn decode_instruction(code: &[i32], ip: usize) -> Result<Instruction, RuntimeError> {
    let word = code[ip];
    let opcode = decode_opcode(word).ok_or(RuntimeError::InvalidOpcode { opcode: word, ip })?;

    let count = opcode.operand_count();
    let mut operands = [0; MAX_OPERANDS];
    for (slot, operand) in operands.iter_mut().enumerate().take(count) {
        *operand = *code
            .get(ip + 1 + slot)
            .ok_or(RuntimeError::TruncatedInstruction { opcode: word, ip })?;
    }

    Ok(Instruction::new(ip, opcode, operands))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_no_operand() {
        let code = [Opcode::IAdd as i32];
        let instr = decode_instruction(&code, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::IAdd);
        assert!(instr.operands().is_empty());
        assert_eq!(instr.next_ip(), 1);
    }

    #[test]
    fn test_decode_with_operand() {
        let code = [Opcode::Halt as i32, Opcode::IConst as i32, -7];
        let instr = decode_instruction(&code, 1).unwrap();
        assert_eq!(instr.opcode, Opcode::IConst);
        assert_eq!(instr.operands(), &[-7]);
        assert_eq!(instr.next_ip(), 3);
    }

    #[test]
    fn test_decode_invalid_opcode() {
        let code = [Opcode::IConst as i32, 1, 0];
        assert!(matches!(
            decode_instruction(&code, 2),
            Err(RuntimeError::InvalidOpcode { opcode: 0, ip: 2 })
        ));
    }

    #[test]
    fn test_decode_truncated_operand() {
        let code = [Opcode::Br as i32];
        assert!(matches!(
            decode_instruction(&code, 0),
            Err(RuntimeError::TruncatedInstruction { ip: 0, .. })
        ));
    }
}
