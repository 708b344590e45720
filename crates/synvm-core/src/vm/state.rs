//! Machine state: everything a snapshot captures.

use super::memory::Memory;
use super::stack::Stack;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineState {
    /// Address of the next opcode to fetch
    pub pc: u16,
    pub stack: Stack,
    pub memory: Memory,
}

impl MachineState {
    pub fn new(memory: Memory) -> Self {
        MachineState {
            pc: 0,
            stack: Stack::new(),
            memory,
        }
    }
}
