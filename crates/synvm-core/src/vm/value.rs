//! Operand Representation
//!
//! A raw code unit is either a literal word or a reference to one of the
//! eight registers mapped directly above the addressable range.

use crate::error::{VmError, VmResult};

/// Number of general-purpose addressable cells
pub const ADDRESS_SPACE: usize = 32768;

/// Number of registers mapped above the addressable range
pub const REGISTER_COUNT: usize = 8;

/// First code unit naming a register
pub const REGISTER_BASE: u16 = ADDRESS_SPACE as u16;

/// Mask applied to every arithmetic result
pub const WORD_MASK: u16 = 0x7FFF;

/// Word arithmetic is performed modulo this value
pub const MODULUS: u32 = ADDRESS_SPACE as u32;

/// Decoded operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Literal word, 0..=32767
    Literal(u16),

    /// Register index, 0..=7
    Register(u8),
}

impl Operand {
    /// Decode a raw code unit. Values past the last register are rejected;
    /// `pc` only labels the error.
    pub fn decode(raw: u16, pc: u16) -> VmResult<Self> {
        match raw {
            0..=WORD_MASK => Ok(Operand::Literal(raw)),
            r if ((r - REGISTER_BASE) as usize) < REGISTER_COUNT => {
                Ok(Operand::Register((r - REGISTER_BASE) as u8))
            }
            _ => Err(VmError::InvalidOperand { value: raw, pc }),
        }
    }

    /// Raw code unit encoding this operand
    pub fn raw(self) -> u16 {
        match self {
            Operand::Literal(v) => v,
            Operand::Register(r) => REGISTER_BASE + r as u16,
        }
    }
}
