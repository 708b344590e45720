//! Opcode Definitions
//!
//! Defines the closed opcode set of the machine.
//! This file contains no execution semantics.
//! Opcode values are fixed by the program images that use them.

/// Machine opcodes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Halt = 0,
    Set  = 1,
    Push = 2,
    Pop  = 3,
    Eq   = 4,
    Gt   = 5,
    Jmp  = 6,
    Jt   = 7,
    Jf   = 8,
    Add  = 9,
    Mult = 10,
    Mod  = 11,
    And  = 12,
    Or   = 13,
    Not  = 14,
    Rmem = 15,
    Wmem = 16,
    Call = 17,
    Ret  = 18,
    Out  = 19,
    In   = 20,
    Noop = 21,
}

impl OpCode {
    /// Every opcode in numeric order
    pub const ALL: [OpCode; 22] = [
        OpCode::Halt,
        OpCode::Set,
        OpCode::Push,
        OpCode::Pop,
        OpCode::Eq,
        OpCode::Gt,
        OpCode::Jmp,
        OpCode::Jt,
        OpCode::Jf,
        OpCode::Add,
        OpCode::Mult,
        OpCode::Mod,
        OpCode::And,
        OpCode::Or,
        OpCode::Not,
        OpCode::Rmem,
        OpCode::Wmem,
        OpCode::Call,
        OpCode::Ret,
        OpCode::Out,
        OpCode::In,
        OpCode::Noop,
    ];

    /// Convert a raw code unit to an opcode
    pub fn from_u16(raw: u16) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Number of operand slots following the opcode
    pub fn operand_count(self) -> usize {
        match self {
            OpCode::Halt | OpCode::Ret | OpCode::Noop => 0,

            OpCode::Push
            | OpCode::Pop
            | OpCode::Jmp
            | OpCode::Call
            | OpCode::Out
            | OpCode::In => 1,

            OpCode::Set
            | OpCode::Jt
            | OpCode::Jf
            | OpCode::Not
            | OpCode::Rmem
            | OpCode::Wmem => 2,

            OpCode::Eq
            | OpCode::Gt
            | OpCode::Add
            | OpCode::Mult
            | OpCode::Mod
            | OpCode::And
            | OpCode::Or => 3,
        }
    }

    /// Code units occupied by the whole instruction
    pub fn width(self) -> u16 {
        1 + self.operand_count() as u16
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Halt => "halt",
            OpCode::Set => "set",
            OpCode::Push => "push",
            OpCode::Pop => "pop",
            OpCode::Eq => "eq",
            OpCode::Gt => "gt",
            OpCode::Jmp => "jmp",
            OpCode::Jt => "jt",
            OpCode::Jf => "jf",
            OpCode::Add => "add",
            OpCode::Mult => "mult",
            OpCode::Mod => "mod",
            OpCode::And => "and",
            OpCode::Or => "or",
            OpCode::Not => "not",
            OpCode::Rmem => "rmem",
            OpCode::Wmem => "wmem",
            OpCode::Call => "call",
            OpCode::Ret => "ret",
            OpCode::Out => "out",
            OpCode::In => "in",
            OpCode::Noop => "noop",
        }
    }
}
