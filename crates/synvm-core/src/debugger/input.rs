//! Debugged input stream
//!
//! Sits between the `in` opcode and the real input source. Input is taken a
//! whole line at a time; command lines are executed here and never reach the
//! pending buffer, so the guest only ever sees complete, newline-terminated
//! lines of its own input.

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::PathBuf;

use crate::bytecode::instruction::disassemble;
use crate::config::VmConfig;
use crate::error::{VmError, VmResult};
use crate::snapshot;
use crate::vm::state::MachineState;
use crate::vm::value::WORD_MASK;

use super::command::DebugCommand;

/// Instructions listed from the current pc on `!halt` and `!dump`
const REPORT_INSTRUCTIONS: usize = 4;

/// Stand-in for characters that do not fit in a 15-bit word
const UNREPRESENTABLE: u16 = b'?' as u16;

/// What the `in` opcode receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Next guest-visible character code
    Char(u16),
    /// `!halt` was issued
    Halt,
    /// `!load` replaced the machine state; the pending instruction is void
    Restored,
}

/// Line-buffered input with the debugger command protocol in front of it
#[derive(Debug)]
pub struct DebugInput<R> {
    source: R,
    pending: VecDeque<u16>,
    enabled: bool,
    dump_path: PathBuf,
    snapshot_path: PathBuf,
}

impl<R: BufRead> DebugInput<R> {
    pub fn new(source: R, config: &VmConfig) -> Self {
        DebugInput {
            source,
            pending: VecDeque::new(),
            enabled: config.debugger,
            dump_path: config.dump_path.clone(),
            snapshot_path: config.snapshot_path.clone(),
        }
    }

    /// Characters of the current line not yet handed to the guest
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Next character for the guest. Blocks on the source when the current
    /// line is used up; command lines read along the way act on `state`.
    pub fn next_char(&mut self, state: &mut MachineState) -> VmResult<InputEvent> {
        if self.pending.is_empty() {
            if let Some(event) = self.fill(state)? {
                return Ok(event);
            }
        }
        match self.pending.pop_front() {
            Some(code) => Ok(InputEvent::Char(code)),
            None => Err(VmError::InputExhausted),
        }
    }

    /// Read lines until one belongs to the guest. Returns an event instead
    /// when a command ends the pending `in`.
    fn fill(&mut self, state: &mut MachineState) -> VmResult<Option<InputEvent>> {
        loop {
            let mut raw = Vec::new();
            if self.source.read_until(b'\n', &mut raw)? == 0 {
                return Err(VmError::InputExhausted);
            }
            while matches!(raw.last(), Some(b'\n' | b'\r')) {
                raw.pop();
            }

            let text = String::from_utf8_lossy(&raw);
            if self.enabled {
                match DebugCommand::parse(&text) {
                    None => {}
                    Some(Ok(command)) => {
                        if let Some(event) = self.execute(command, state) {
                            return Ok(Some(event));
                        }
                        continue;
                    }
                    Some(Err(err)) => {
                        log::warn!("debugger: {err}");
                        continue;
                    }
                }
            }

            self.pending.extend(text.chars().map(|ch| {
                u16::try_from(u32::from(ch))
                    .ok()
                    .filter(|code| *code <= WORD_MASK)
                    .unwrap_or(UNREPRESENTABLE)
            }));
            self.pending.push_back(b'\n' as u16);
            return Ok(None);
        }
    }

    /// Run one command. Failures are reported and leave `state` untouched.
    fn execute(&mut self, command: DebugCommand, state: &mut MachineState) -> Option<InputEvent> {
        let result = match command {
            DebugCommand::Halt => {
                log::info!("debugger: halt requested at pc {}", state.pc);
                report_position(state);
                return Some(InputEvent::Halt);
            }
            DebugCommand::Dump => snapshot::dump_memory(&self.dump_path, &state.memory)
                .map(|()| {
                    report_position(state);
                    format!("memory dumped to {}", self.dump_path.display())
                }),
            DebugCommand::Save => snapshot::save_snapshot(&self.snapshot_path, state)
                .map(|()| format!("snapshot saved to {}", self.snapshot_path.display())),
            DebugCommand::Load => match snapshot::load_snapshot(&self.snapshot_path) {
                Ok(restored) => {
                    *state = restored;
                    log::info!(
                        "debugger: snapshot restored from {} (pc {})",
                        self.snapshot_path.display(),
                        state.pc
                    );
                    return Some(InputEvent::Restored);
                }
                Err(err) => Err(err),
            },
            DebugCommand::Set { address, value } => state
                .memory
                .write(address as usize, value)
                .map(|()| format!("memory[{address}] = {value}")),
        };

        match result {
            Ok(message) => log::info!("debugger: {message}"),
            Err(err) => log::warn!("debugger: {} failed: {err}", command.name()),
        }
        None
    }
}

/// Log the instructions about to run
fn report_position(state: &MachineState) {
    if !log::log_enabled!(log::Level::Info) {
        return;
    }
    for (address, text) in disassemble(&state.memory, state.pc, REPORT_INSTRUCTIONS) {
        log::info!("debugger: {address:>5}: {text}");
    }
}
