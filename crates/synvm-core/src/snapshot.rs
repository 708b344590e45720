//! Snapshot Codec
//!
//! Binary layout, all little-endian, no header:
//!
//! ```text
//! pc          u16
//! stack_len   u32
//! stack       stack_len x u16, bottom to top
//! memory      32776 x u16, address order
//! ```
//!
//! A memory dump is the `memory` section on its own.

use std::fs;
use std::path::Path;

use crate::error::{VmError, VmResult};
use crate::vm::memory::{Memory, MEMORY_BYTES};
use crate::vm::stack::Stack;
use crate::vm::state::MachineState;

/// Serialize `state` into the snapshot layout
pub fn encode(state: &MachineState) -> Vec<u8> {
    let stack = state.stack.as_slice();
    let mut buf = Vec::with_capacity(2 + 4 + stack.len() * 2 + MEMORY_BYTES);
    buf.extend_from_slice(&state.pc.to_le_bytes());
    buf.extend_from_slice(&(stack.len() as u32).to_le_bytes());
    for value in stack {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    buf.extend_from_slice(&state.memory.to_le_bytes());
    buf
}

/// Parse a snapshot. The input must be consumed exactly.
pub fn decode(bytes: &[u8]) -> VmResult<MachineState> {
    let mut cursor = 0usize;

    let pc = read_u16(bytes, &mut cursor)?;
    let depth = read_u32(bytes, &mut cursor)? as usize;

    let stack_bytes = depth
        .checked_mul(2)
        .ok_or_else(|| VmError::InvalidSnapshot(format!("stack depth {depth} overflows")))?;
    let expected = cursor + stack_bytes + MEMORY_BYTES;
    if bytes.len() != expected {
        return Err(VmError::InvalidSnapshot(format!(
            "length mismatch (expected {expected} bytes for stack depth {depth}, got {})",
            bytes.len()
        )));
    }

    let mut values = Vec::with_capacity(depth);
    for _ in 0..depth {
        values.push(read_u16(bytes, &mut cursor)?);
    }
    let memory = Memory::from_le_bytes(&bytes[cursor..])?;

    Ok(MachineState {
        pc,
        stack: Stack::from_values(values),
        memory,
    })
}

pub fn save_snapshot(path: &Path, state: &MachineState) -> VmResult<()> {
    fs::write(path, encode(state))?;
    log::debug!(
        "saved snapshot to {} (pc={}, stack depth={})",
        path.display(),
        state.pc,
        state.stack.size()
    );
    Ok(())
}

/// Read and decode a snapshot file. Nothing is returned unless the whole
/// file decodes, so callers can swap state in afterwards.
pub fn load_snapshot(path: &Path) -> VmResult<MachineState> {
    let bytes = fs::read(path)?;
    let state = decode(&bytes)?;
    log::debug!(
        "loaded snapshot from {} (pc={}, stack depth={})",
        path.display(),
        state.pc,
        state.stack.size()
    );
    Ok(state)
}

/// Write the raw memory image
pub fn dump_memory(path: &Path, memory: &Memory) -> VmResult<()> {
    fs::write(path, memory.to_le_bytes())?;
    log::debug!("dumped {} bytes of memory to {}", MEMORY_BYTES, path.display());
    Ok(())
}

fn read_u16(bytes: &[u8], cursor: &mut usize) -> VmResult<u16> {
    let end = *cursor + 2;
    let chunk = bytes
        .get(*cursor..end)
        .ok_or_else(|| VmError::InvalidSnapshot("truncated".to_string()))?;
    *cursor = end;
    Ok(u16::from_le_bytes([chunk[0], chunk[1]]))
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> VmResult<u32> {
    let end = *cursor + 4;
    let chunk = bytes
        .get(*cursor..end)
        .ok_or_else(|| VmError::InvalidSnapshot("truncated".to_string()))?;
    *cursor = end;
    Ok(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}
