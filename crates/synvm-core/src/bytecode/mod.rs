pub mod instruction;
pub mod opcode;

pub use instruction::{disassemble, Instruction};
pub use opcode::OpCode;
