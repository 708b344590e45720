//! Program Loader
//!
//! Unpacks a program image into memory. The image is a flat sequence of
//! little-endian 16-bit code units placed from address 0; there is no header.

use std::fs;
use std::path::Path;

use crate::error::{VmError, VmResult};
use crate::vm::memory::Memory;
use crate::vm::value::ADDRESS_SPACE;

/// Program loader
pub struct ProgramLoader;

impl ProgramLoader {
    /// Load a program image from raw bytes. A trailing odd byte is ignored.
    pub fn load(bytes: &[u8]) -> VmResult<Memory> {
        let words = Self::unpack(bytes);
        if words.len() > ADDRESS_SPACE {
            return Err(VmError::ProgramTooLarge(words.len()));
        }
        if bytes.len() % 2 != 0 {
            log::debug!("ignoring trailing odd byte of program image");
        }
        log::debug!("loaded program image of {} words", words.len());
        Memory::with_image(&words)
    }

    pub fn load_file(path: &Path) -> VmResult<Memory> {
        let bytes = fs::read(path)?;
        Self::load(&bytes)
    }

    /// Byte pairs to code units, low byte first
    pub fn unpack(bytes: &[u8]) -> Vec<u16> {
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }
}
