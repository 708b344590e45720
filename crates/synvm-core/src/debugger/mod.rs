//! Debugger overlay on the guest input stream

pub mod command;
pub mod input;

pub use command::{CommandError, DebugCommand};
pub use input::{DebugInput, InputEvent};
