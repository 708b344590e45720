//! VM Memory Model
//!
//! Word-addressed memory: 32768 addressable cells followed by the eight
//! register cells. Registers are ordinary cells to every writer; only the
//! operand resolver treats their addresses specially.

use crate::error::{VmError, VmResult};
use super::value::{Operand, ADDRESS_SPACE, REGISTER_BASE, REGISTER_COUNT};

/// Total number of cells, registers included
pub const MEMORY_SIZE: usize = ADDRESS_SPACE + REGISTER_COUNT;

/// Size in bytes of the little-endian memory image
pub const MEMORY_BYTES: usize = MEMORY_SIZE * 2;

/// Fixed-size memory of raw code units
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Box<[u16]>,
}

impl Memory {
    /// Zero-filled memory
    pub fn new() -> Self {
        Memory {
            cells: vec![0u16; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Memory with `image` copied in from address 0
    pub fn with_image(image: &[u16]) -> VmResult<Self> {
        let mut memory = Memory::new();
        memory.load_image(image)?;
        Ok(memory)
    }

    /// Copy `image` into memory from address 0. Registers are never
    /// touched by a program image.
    pub fn load_image(&mut self, image: &[u16]) -> VmResult<()> {
        if image.len() > ADDRESS_SPACE {
            return Err(VmError::ProgramTooLarge(image.len()));
        }
        self.cells[..image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn read(&self, address: usize) -> VmResult<u16> {
        self.cells
            .get(address)
            .copied()
            .ok_or(VmError::AddressOutOfRange(address))
    }

    pub fn write(&mut self, address: usize, value: u16) -> VmResult<()> {
        let cell = self
            .cells
            .get_mut(address)
            .ok_or(VmError::AddressOutOfRange(address))?;
        *cell = value;
        Ok(())
    }

    /// Effective value of a raw code unit: literals pass through,
    /// register references read the register cell.
    pub fn resolve(&self, raw: u16, pc: u16) -> VmResult<u16> {
        match Operand::decode(raw, pc)? {
            Operand::Literal(v) => Ok(v),
            Operand::Register(r) => Ok(self.register(r as usize)),
        }
    }

    /// Register contents; `index` must be below 8.
    pub fn register(&self, index: usize) -> u16 {
        self.cells[REGISTER_BASE as usize + index % REGISTER_COUNT]
    }

    pub fn set_register(&mut self, index: usize, value: u16) {
        self.cells[REGISTER_BASE as usize + index % REGISTER_COUNT] = value;
    }

    pub fn registers(&self) -> &[u16] {
        &self.cells[REGISTER_BASE as usize..]
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.cells
    }

    /// Every cell in address order, little-endian
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MEMORY_BYTES);
        for cell in self.cells.iter() {
            out.extend_from_slice(&cell.to_le_bytes());
        }
        out
    }

    /// Inverse of `to_le_bytes`; `bytes` must hold exactly one full image.
    pub fn from_le_bytes(bytes: &[u8]) -> VmResult<Self> {
        if bytes.len() != MEMORY_BYTES {
            return Err(VmError::InvalidSnapshot(format!(
                "memory image length mismatch (expected {MEMORY_BYTES}, got {})",
                bytes.len()
            )));
        }
        let cells = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Memory { cells })
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("size", &self.cells.len())
            .field("registers", &self.registers())
            .finish()
    }
}
