//! synvm - Core Library
//!
//! A 15-bit word virtual machine with eight registers, an unbounded stack and
//! an inline debugger that listens on the guest's own input stream.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;
pub mod debugger;
pub mod snapshot;
pub mod loader;

// Re-export commonly used types
pub use error::{VmError, VmResult};
pub use config::VmConfig;
pub use bytecode::opcode::OpCode;
pub use vm::vm::{HaltReason, RunOutcome, StepOutcome, VirtualMachine};
pub use vm::{MachineState, Memory};
pub use loader::ProgramLoader;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Empty};

    fn machine(image: &[u16]) -> VirtualMachine<Empty, Vec<u8>> {
        let memory = Memory::with_image(image).expect("image too large");
        VirtualMachine::new(VmConfig::new(), memory, io::empty(), Vec::new())
    }

    #[test]
    fn out_then_halt() {
        let mut vm = machine(&[19, 65, 0]);
        let outcome = vm.run().expect("execution failed");
        assert_eq!(outcome, RunOutcome::Halted(HaltReason::Instruction));
        assert_eq!(vm.cycles(), 2);
        assert_eq!(vm.pc(), 3);
        assert_eq!(vm.into_output(), b"A");
    }

    #[test]
    fn add_wraps_modulo_32768() {
        let mut vm = machine(&[9, 32768, 32767, 32767, 0]);
        vm.run().expect("execution failed");
        assert_eq!(vm.memory().register(0), 32766);
    }

    #[test]
    fn pop_on_empty_stack_faults() {
        let mut vm = machine(&[3, 32768]);
        let res = vm.run();
        assert!(matches!(res, Err(VmError::StackUnderflow { pc: 0 })));
        assert_eq!(vm.halted(), None);
    }

    #[test]
    fn ret_on_empty_stack_halts_cleanly() {
        let mut vm = machine(&[18]);
        let outcome = vm.run().expect("execution failed");
        assert_eq!(outcome, RunOutcome::Halted(HaltReason::EmptyReturn));
        assert_eq!(vm.cycles(), 1);
    }

    #[test]
    fn unknown_opcode_faults() {
        let mut vm = machine(&[21, 22]);
        assert!(matches!(
            vm.run(),
            Err(VmError::InvalidOpcode { opcode: 22, pc: 1 })
        ));
        assert_eq!(vm.cycles(), 2);
        assert_eq!(vm.pc(), 1);
    }

    #[test]
    fn mod_by_zero_faults() {
        let mut vm = machine(&[11, 32768, 7, 0]);
        assert!(matches!(vm.run(), Err(VmError::DivisionByZero { pc: 0 })));
    }

    #[test]
    fn invalid_operand_faults() {
        let mut vm = machine(&[19, 32776]);
        assert!(matches!(
            vm.run(),
            Err(VmError::InvalidOperand { value: 32776, pc: 0 })
        ));
    }

    #[test]
    fn running_off_the_end_faults() {
        // push r6; ret -> pc 32775, where r7 holds a noop
        let mut vm = machine(&[2, 32774, 18]);
        vm.memory_mut().set_register(6, 32775);
        vm.memory_mut().set_register(7, 21);
        assert!(matches!(vm.run(), Err(VmError::AddressOutOfRange(32776))));
        assert_eq!(vm.cycles(), 4);
    }

    #[test]
    fn cycle_limit_stops_run() {
        let memory = Memory::with_image(&[6, 0]).unwrap();
        let config = VmConfig::new().with_cycle_limit(Some(10));
        let mut vm = VirtualMachine::new(config, memory, io::empty(), Vec::new());
        assert_eq!(vm.run().unwrap(), RunOutcome::CycleLimit);
        assert_eq!(vm.cycles(), 10);
    }

    #[test]
    fn halted_machine_stays_halted() {
        let mut vm = machine(&[0, 19, 65]);
        vm.run().expect("execution failed");
        assert_eq!(vm.step().unwrap(), StepOutcome::Halted(HaltReason::Instruction));
        assert_eq!(vm.cycles(), 1);
        assert!(vm.output().is_empty());
    }

    #[test]
    fn in_reads_lines_and_debugger_halts() {
        // in r0; out r0; jmp 0
        let memory = Memory::with_image(&[20, 32768, 19, 32768, 6, 0]).unwrap();
        let input = Cursor::new(&b"hi\n!halt\n"[..]);
        let mut vm = VirtualMachine::new(VmConfig::new(), memory, input, Vec::new());
        let outcome = vm.run().expect("execution failed");
        assert_eq!(outcome, RunOutcome::Halted(HaltReason::Debugger));
        assert_eq!(vm.pc(), 0);
        assert_eq!(vm.into_output(), b"hi\n");
    }

    #[test]
    fn input_exhaustion_is_reported() {
        let memory = Memory::with_image(&[20, 32768, 0]).unwrap();
        let mut vm = VirtualMachine::new(VmConfig::new(), memory, io::empty(), Vec::new());
        assert!(matches!(vm.run(), Err(VmError::InputExhausted)));
    }
}
