//! Virtual Machine Core
//!
//! Defines the virtual machine structure and its fetch-decode-execute loop.
//! The machine is single-threaded; the only blocking point is the `in`
//! opcode waiting for a line from the input source.

use std::io::{BufRead, Write};

use crate::bytecode::instruction::Instruction;
use crate::bytecode::opcode::OpCode;
use crate::config::VmConfig;
use crate::debugger::{DebugInput, InputEvent};
use crate::error::{VmError, VmResult};

use super::memory::{Memory, MEMORY_SIZE};
use super::stack::Stack;
use super::state::MachineState;
use super::value::{MODULUS, WORD_MASK};

/// Why the machine stopped normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// `halt` opcode
    Instruction,
    /// `ret` with an empty stack
    EmptyReturn,
    /// `!halt` debugger command
    Debugger,
}

/// Result of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halted(HaltReason),
}

/// Result of `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Halted(HaltReason),
    /// The configured cycle limit was reached before a halt
    CycleLimit,
}

/// Virtual Machine
#[derive(Debug)]
pub struct VirtualMachine<R, W> {
    config: VmConfig,
    state: MachineState,
    cycles: u64,
    halted: Option<HaltReason>,

    input: DebugInput<R>,
    output: W,
}

impl<R: BufRead, W: Write> VirtualMachine<R, W> {
    /// Create a new VM instance over a loaded memory image
    pub fn new(config: VmConfig, memory: Memory, input: R, output: W) -> Self {
        VirtualMachine {
            input: DebugInput::new(input, &config),
            state: MachineState::new(memory),
            cycles: 0,
            halted: None,
            output,
            config,
        }
    }

    /// Execute until halt, cycle limit or fault
    pub fn run(&mut self) -> VmResult<RunOutcome> {
        loop {
            if let Some(limit) = self.config.cycle_limit {
                if self.cycles >= limit {
                    self.output.flush()?;
                    return Ok(RunOutcome::CycleLimit);
                }
            }
            if let StepOutcome::Halted(reason) = self.step()? {
                self.output.flush()?;
                log::debug!(
                    "halted ({:?}) after {} cycles at pc {}",
                    reason,
                    self.cycles,
                    self.state.pc
                );
                return Ok(RunOutcome::Halted(reason));
            }
        }
    }

    /// Execute a single instruction. A halted machine stays halted.
    pub fn step(&mut self) -> VmResult<StepOutcome> {
        if let Some(reason) = self.halted {
            return Ok(StepOutcome::Halted(reason));
        }

        let pc = self.state.pc;
        // a fetch counts even when decoding it faults
        self.cycles += 1;
        let inst = Instruction::decode(&self.state.memory, pc)?;
        log::trace!("{:>8} {:>5}: {}", self.cycles, pc, inst);

        let [a, b, c] = inst.operands;
        let next = pc + inst.opcode.width();

        match inst.opcode {
            OpCode::Halt => {
                self.state.pc = next;
                return Ok(self.halt(HaltReason::Instruction));
            }
            OpCode::Set => {
                let value = self.resolve(b, pc)?;
                self.store(a, value, pc)?;
            }
            OpCode::Push => {
                let value = self.resolve(a, pc)?;
                self.state.stack.push(value);
            }
            OpCode::Pop => {
                let value = self.state.stack.pop().ok_or(VmError::StackUnderflow { pc })?;
                self.store(a, value, pc)?;
            }
            OpCode::Eq => {
                let value = (self.resolve(b, pc)? == self.resolve(c, pc)?) as u16;
                self.store(a, value, pc)?;
            }
            OpCode::Gt => {
                let value = (self.resolve(b, pc)? > self.resolve(c, pc)?) as u16;
                self.store(a, value, pc)?;
            }
            OpCode::Jmp => {
                self.state.pc = self.resolve(a, pc)?;
                return Ok(StepOutcome::Continue);
            }
            OpCode::Jt => {
                if self.resolve(a, pc)? != 0 {
                    self.state.pc = self.resolve(b, pc)?;
                    return Ok(StepOutcome::Continue);
                }
            }
            OpCode::Jf => {
                if self.resolve(a, pc)? == 0 {
                    self.state.pc = self.resolve(b, pc)?;
                    return Ok(StepOutcome::Continue);
                }
            }
            OpCode::Add => {
                let sum = self.resolve(b, pc)? as u32 + self.resolve(c, pc)? as u32;
                self.store(a, (sum % MODULUS) as u16, pc)?;
            }
            OpCode::Mult => {
                let product = self.resolve(b, pc)? as u32 * self.resolve(c, pc)? as u32;
                self.store(a, (product % MODULUS) as u16, pc)?;
            }
            OpCode::Mod => {
                let divisor = self.resolve(c, pc)?;
                if divisor == 0 {
                    return Err(VmError::DivisionByZero { pc });
                }
                let value = self.resolve(b, pc)? % divisor;
                self.store(a, value & WORD_MASK, pc)?;
            }
            OpCode::And => {
                let value = self.resolve(b, pc)? & self.resolve(c, pc)?;
                self.store(a, value & WORD_MASK, pc)?;
            }
            OpCode::Or => {
                let value = self.resolve(b, pc)? | self.resolve(c, pc)?;
                self.store(a, value & WORD_MASK, pc)?;
            }
            OpCode::Not => {
                let value = !self.resolve(b, pc)?;
                self.store(a, value & WORD_MASK, pc)?;
            }
            OpCode::Rmem => {
                let address = self.resolve(b, pc)?;
                let value = self.state.memory.read(address as usize)?;
                self.store(a, value, pc)?;
            }
            OpCode::Wmem => {
                let address = self.resolve(a, pc)?;
                let value = self.resolve(b, pc)?;
                self.state.memory.write(address as usize, value)?;
            }
            OpCode::Call => {
                let target = self.resolve(a, pc)?;
                self.state.stack.push(next);
                self.state.pc = target;
                return Ok(StepOutcome::Continue);
            }
            OpCode::Ret => match self.state.stack.pop() {
                Some(target) => {
                    self.state.pc = target;
                    return Ok(StepOutcome::Continue);
                }
                None => {
                    self.state.pc = next;
                    return Ok(self.halt(HaltReason::EmptyReturn));
                }
            },
            OpCode::Out => {
                let code = self.resolve(a, pc)?;
                let ch = char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
                write!(self.output, "{ch}")?;
            }
            OpCode::In => {
                self.output.flush()?;
                match self.input.next_char(&mut self.state)? {
                    InputEvent::Char(code) => self.store(a, code, pc)?,
                    InputEvent::Halt => return Ok(self.halt(HaltReason::Debugger)),
                    // pc now comes from the snapshot
                    InputEvent::Restored => return Ok(StepOutcome::Continue),
                }
            }
            OpCode::Noop => {}
        }

        self.state.pc = next;
        Ok(StepOutcome::Continue)
    }

    fn halt(&mut self, reason: HaltReason) -> StepOutcome {
        self.halted = Some(reason);
        StepOutcome::Halted(reason)
    }

    fn resolve(&self, raw: u16, pc: u16) -> VmResult<u16> {
        self.state.memory.resolve(raw, pc)
    }

    /// Write to a destination operand, which names a cell by raw address.
    fn store(&mut self, dest: u16, value: u16, pc: u16) -> VmResult<()> {
        if dest as usize >= MEMORY_SIZE {
            return Err(VmError::InvalidOperand { value: dest, pc });
        }
        self.state.memory.write(dest as usize, value)
    }

    /// Replace PC, stack and memory in one go
    pub fn restore(&mut self, state: MachineState) {
        self.state = state;
        self.halted = None;
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn stack(&self) -> &Stack {
        &self.state.stack
    }

    pub fn memory(&self) -> &Memory {
        &self.state.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.state.memory
    }

    pub fn halted(&self) -> Option<HaltReason> {
        self.halted
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
