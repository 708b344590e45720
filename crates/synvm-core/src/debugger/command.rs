//! Debugger command lines
//!
//! A line whose first whitespace-delimited token is one of the known
//! commands is consumed by the debugger. Every other line, including
//! unknown `!words`, belongs to the guest.

use thiserror::Error;

use crate::vm::memory::MEMORY_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugCommand {
    /// `!halt`: stop the VM immediately
    Halt,
    /// `!dump`: write the raw memory image
    Dump,
    /// `!save`: write a snapshot
    Save,
    /// `!load`: restore a snapshot
    Load,
    /// `!set <address> <value>`: poke one memory cell
    Set { address: u16, value: u16 },
}

/// Errors surfaced while parsing a recognized command's arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{command}: '{text}' is not an unsigned 16-bit integer")]
    InvalidNumber { command: &'static str, text: String },
    #[error("{command}: address {address} is outside memory")]
    AddressOutOfRange { command: &'static str, address: u16 },
}

impl DebugCommand {
    /// `None` when the line is guest input, otherwise the parsed command or
    /// the reason a recognized command was rejected.
    pub fn parse(line: &str) -> Option<Result<DebugCommand, CommandError>> {
        let mut tokens = line.split_whitespace();
        let command = match tokens.next()? {
            "!halt" => Ok(DebugCommand::Halt),
            "!dump" => Ok(DebugCommand::Dump),
            "!save" => Ok(DebugCommand::Save),
            "!load" => Ok(DebugCommand::Load),
            "!set" => parse_set(&mut tokens),
            _ => return None,
        };
        Some(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DebugCommand::Halt => "!halt",
            DebugCommand::Dump => "!dump",
            DebugCommand::Save => "!save",
            DebugCommand::Load => "!load",
            DebugCommand::Set { .. } => "!set",
        }
    }
}

fn parse_set<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<DebugCommand, CommandError> {
    let address = parse_u16(tokens.next(), "address")?;
    let value = parse_u16(tokens.next(), "value")?;
    if address as usize >= MEMORY_SIZE {
        return Err(CommandError::AddressOutOfRange {
            command: "!set",
            address,
        });
    }
    Ok(DebugCommand::Set { address, value })
}

fn parse_u16(token: Option<&str>, argument: &'static str) -> Result<u16, CommandError> {
    let text = token.ok_or(CommandError::MissingArgument {
        command: "!set",
        argument,
    })?;
    text.parse::<u16>().map_err(|_| CommandError::InvalidNumber {
        command: "!set",
        text: text.to_string(),
    })
}
