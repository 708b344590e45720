//! VM Configuration
//!
//! Host-side settings for a VM instance: where debugger commands write
//! their files and optional execution limits. Enforcement is handled by the VM.

use std::path::{Path, PathBuf};

/// Default target of the `!dump` debugger command
pub const DEFAULT_DUMP_PATH: &str = "memory.bin";

/// Default target of the `!save` and `!load` debugger commands
pub const DEFAULT_SNAPSHOT_PATH: &str = "snapshot.bin";

/// VM Configuration
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// File written by `!dump`
    pub dump_path: PathBuf,

    /// File written by `!save` and read by `!load`
    pub snapshot_path: PathBuf,

    /// Stop `run` after this many instructions
    pub cycle_limit: Option<u64>,

    /// Intercept `!` command lines on the input stream
    pub debugger: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            dump_path: PathBuf::from(DEFAULT_DUMP_PATH),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            cycle_limit: None,
            debugger: true,
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dump_path(mut self, path: impl AsRef<Path>) -> Self {
        self.dump_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_snapshot_path(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_cycle_limit(mut self, limit: Option<u64>) -> Self {
        self.cycle_limit = limit;
        self
    }

    pub fn with_debugger(mut self, enabled: bool) -> Self {
        self.debugger = enabled;
        self
    }
}
