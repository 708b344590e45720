//! Instruction Representation
//!
//! Decoding of one instruction out of memory, plus a one-line disassembly
//! used by trace logging and debugger reports.

use std::fmt;

use crate::error::{VmError, VmResult};
use crate::vm::memory::Memory;
use crate::vm::value::Operand;
use super::opcode::OpCode;

/// Decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: OpCode,
    /// Raw operand code units; slots past `opcode.operand_count()` are zero
    pub operands: [u16; 3],
}

impl Instruction {
    /// Decode the instruction at `pc`. Only the operand slots the opcode
    /// declares are read.
    pub fn decode(memory: &Memory, pc: u16) -> VmResult<Self> {
        let raw = memory.read(pc as usize)?;
        let opcode = OpCode::from_u16(raw).ok_or(VmError::InvalidOpcode { opcode: raw, pc })?;

        let mut operands = [0u16; 3];
        for (i, slot) in operands.iter_mut().take(opcode.operand_count()).enumerate() {
            *slot = memory.read(pc as usize + 1 + i)?;
        }
        Ok(Instruction { opcode, operands })
    }

    /// Operand slots the opcode actually uses
    pub fn args(&self) -> &[u16] {
        &self.operands[..self.opcode.operand_count()]
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode.mnemonic())?;
        for &raw in self.args() {
            match Operand::decode(raw, 0) {
                Ok(Operand::Register(r)) => write!(f, " r{r}")?,
                Ok(Operand::Literal(v)) => write!(f, " {v}")?,
                Err(_) => write!(f, " ?{raw}")?,
            }
        }
        Ok(())
    }
}

/// Disassemble up to `count` instructions starting at `start`. Stops early at
/// the first cell that does not decode; that cell is reported as `.word`.
pub fn disassemble(memory: &Memory, start: u16, count: usize) -> Vec<(u16, String)> {
    let mut out = Vec::with_capacity(count);
    let mut pc = start;
    for _ in 0..count {
        match Instruction::decode(memory, pc) {
            Ok(inst) => {
                out.push((pc, inst.to_string()));
                match pc.checked_add(inst.opcode.width()) {
                    Some(next) => pc = next,
                    None => break,
                }
            }
            Err(_) => {
                if let Ok(raw) = memory.read(pc as usize) {
                    out.push((pc, format!(".word {raw}")));
                }
                break;
            }
        }
    }
    out
}
