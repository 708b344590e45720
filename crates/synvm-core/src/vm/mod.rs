pub mod memory;
pub mod stack;
pub mod state;
pub mod value;
pub mod vm;

pub use memory::Memory;
pub use state::MachineState;
pub use value::Operand;
pub use vm::{HaltReason, RunOutcome, StepOutcome, VirtualMachine};
