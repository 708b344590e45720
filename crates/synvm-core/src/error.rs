//! VM Error Types
//!
//! Defines every abnormal outcome of loading or running a program.
//! A normal `halt` is never an error; see `vm::HaltReason`.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    // Malformed program
    #[error("invalid operand {value} at pc {pc}")]
    InvalidOperand { value: u16, pc: u16 },
    #[error("address out of range: {0}")]
    AddressOutOfRange(usize),
    #[error("invalid opcode {opcode} at pc {pc}")]
    InvalidOpcode { opcode: u16, pc: u16 },
    #[error("program image too large: {0} words")]
    ProgramTooLarge(usize),

    // Runtime faults
    #[error("stack underflow at pc {pc}")]
    StackUnderflow { pc: u16 },
    #[error("division by zero at pc {pc}")]
    DivisionByZero { pc: u16 },

    // Snapshot codec
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    // IO boundary
    #[error("input exhausted while waiting for a character")]
    InputExhausted,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl VmError {
    /// True for conditions raised by the guest program itself rather than
    /// by the surrounding resources.
    pub fn is_fault(&self) -> bool {
        !matches!(
            self,
            VmError::InvalidSnapshot(_) | VmError::InputExhausted | VmError::Io(_)
        )
    }
}

pub type VmResult<T> = Result<T, VmError>;
