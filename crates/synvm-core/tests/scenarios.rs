use std::io::{self, Cursor, Empty};

use synvm_core::{
    snapshot, HaltReason, Memory, RunOutcome, VirtualMachine, VmConfig, VmError,
};

const R0: u16 = 32768;
const R1: u16 = 32769;

fn machine(image: &[u16]) -> VirtualMachine<Empty, Vec<u8>> {
    let memory = Memory::with_image(image).expect("image too large");
    VirtualMachine::new(VmConfig::new(), memory, io::empty(), Vec::new())
}

fn output_of(vm: VirtualMachine<Empty, Vec<u8>>) -> String {
    String::from_utf8(vm.into_output()).expect("output is not utf-8")
}

#[test]
fn halt_counts_one_cycle() {
    let mut vm = machine(&[0]);
    vm.run().expect("execution failed");
    assert_eq!(vm.cycles(), 1);
}

#[test]
fn out_writes_literals_and_registers() {
    let mut vm = machine(&[19, 65, 19, R0]);
    vm.memory_mut().set_register(0, 66);
    vm.run().expect("execution failed");
    assert_eq!(output_of(vm), "AB");
}

#[test]
fn set_register_from_literal_and_register() {
    let mut vm = machine(&[1, R0, 123]);
    vm.run().expect("execution failed");
    assert_eq!(vm.memory().register(0), 123);

    let mut vm = machine(&[1, R0, R1]);
    vm.memory_mut().set_register(1, 456);
    vm.run().expect("execution failed");
    assert_eq!(vm.memory().register(0), 456);
}

#[test]
fn push_resolves_operands() {
    let mut vm = machine(&[2, 123, 2, R1]);
    vm.memory_mut().set_register(1, 456);
    vm.run().expect("execution failed");
    assert_eq!(vm.stack().as_slice(), &[123, 456]);
}

#[test]
fn jmp_to_literal_then_register() {
    let mut image = vec![0u16; 12];
    image[0] = 6;
    image[1] = 5;
    image[5] = 6;
    image[6] = R0;
    image[10] = 19;
    image[11] = 65;
    let mut vm = machine(&image);
    vm.memory_mut().set_register(0, 10);
    vm.run().expect("execution failed");
    assert_eq!(output_of(vm), "A");
}

#[test]
fn jt_and_jf_branch_on_register() {
    for (opcode, flag, expected) in [(7, 1, "A"), (7, 0, ""), (8, 0, "A"), (8, 1, "")] {
        let mut image = vec![0u16; 12];
        image[0] = opcode;
        image[1] = R0;
        image[2] = 10;
        image[10] = 19;
        image[11] = 65;
        let mut vm = machine(&image);
        vm.memory_mut().set_register(0, flag);
        vm.run().expect("execution failed");
        assert_eq!(vm.pc(), if expected.is_empty() { 4 } else { 13 });
        assert_eq!(output_of(vm), expected);
    }
}

#[test]
fn arithmetic_and_bitwise() {
    let image = [
        10, R0, 32767, 3, // mult r0 32767 3
        11, R1, 17, 5, // mod r1 17 5
        12, 32770, 0x7F0F, 0x00FF, // and r2
        13, 32771, 0x4000, 0x0001, // or r3
        14, 32772, 0, // not r4 0
        4, 32773, 7, 7, // eq r5 7 7
        5, 32774, 3, 7, // gt r6 3 7
        0,
    ];
    let mut vm = machine(&image);
    vm.run().expect("execution failed");
    let regs = vm.memory().registers();
    assert_eq!(regs[0], (32767u32 * 3 % 32768) as u16);
    assert_eq!(regs[1], 2);
    assert_eq!(regs[2], 0x000F);
    assert_eq!(regs[3], 0x4001);
    assert_eq!(regs[4], 0x7FFF);
    assert_eq!(regs[5], 1);
    assert_eq!(regs[6], 0);
}

#[test]
fn rmem_and_wmem_use_resolved_addresses() {
    // wmem 100 r0; rmem r1 100
    let mut vm = machine(&[16, 100, R0, 15, R1, 100, 0]);
    vm.memory_mut().set_register(0, 4242);
    vm.run().expect("execution failed");
    assert_eq!(vm.memory().read(100).unwrap(), 4242);
    assert_eq!(vm.memory().register(1), 4242);
}

#[test]
fn call_and_ret() {
    // call 4; halt; noop; out 65; ret
    let mut vm = machine(&[17, 4, 0, 21, 19, 65, 18]);
    let outcome = vm.run().expect("execution failed");
    assert_eq!(outcome, RunOutcome::Halted(HaltReason::Instruction));
    assert_eq!(vm.pc(), 3);
    assert!(vm.stack().is_empty());
    assert_eq!(output_of(vm), "A");
}

#[test]
fn add_overflow_scenario() {
    let mut vm = machine(&[9, R0, 32767, 32767, 19, R0, 0]);
    vm.run().expect("execution failed");
    assert_eq!(vm.memory().register(0), 32766);
    assert_eq!(output_of(vm), char::from_u32(32766).unwrap().to_string());
}

#[test]
fn pop_and_ret_on_empty_stack_differ() {
    let mut vm = machine(&[3, R0]);
    let err = vm.run().unwrap_err();
    assert!(matches!(err, VmError::StackUnderflow { .. }));
    assert!(err.is_fault());

    let mut vm = machine(&[18]);
    assert_eq!(vm.run().unwrap(), RunOutcome::Halted(HaltReason::EmptyReturn));
}

#[test]
fn set_command_does_not_consume_guest_input() {
    // in r1; halt
    let memory = Memory::with_image(&[20, R1, 0]).unwrap();
    let input = Cursor::new(&b"!set 32768 5\nxyz\n"[..]);
    let mut vm = VirtualMachine::new(VmConfig::new(), memory, input, Vec::new());
    vm.run().expect("execution failed");
    assert_eq!(vm.memory().read(32768).unwrap(), 5);
    assert_eq!(vm.memory().register(1), b'x' as u16);
}

#[test]
fn echo_program_sees_newline_terminated_lines() {
    // loop: in r0; out r0; jmp 0
    let memory = Memory::with_image(&[20, R0, 19, R0, 6, 0]).unwrap();
    let input = Cursor::new(&b"north\n!dump\nsouth"[..]);
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = VmConfig::new().with_dump_path(dir.path().join("dump.bin"));
    let mut vm = VirtualMachine::new(config, memory, input, Vec::new());
    assert!(matches!(vm.run(), Err(VmError::InputExhausted)));
    assert_eq!(vm.into_output(), b"north\nsouth\n");
    assert!(dir.path().join("dump.bin").exists());
}

#[test]
fn echo_round_trips_non_ascii_lines() {
    // loop: in r0; out r0; jmp 0
    let memory = Memory::with_image(&[20, R0, 19, R0, 6, 0]).unwrap();
    let input = Cursor::new("héllo wörld\n!halt\n".as_bytes());
    let mut vm = VirtualMachine::new(VmConfig::new(), memory, input, Vec::new());
    let outcome = vm.run().expect("execution failed");
    assert_eq!(outcome, RunOutcome::Halted(HaltReason::Debugger));
    let output = String::from_utf8(vm.into_output()).expect("output is not utf-8");
    assert_eq!(output, "héllo wörld\n");
}

#[test]
fn save_and_load_resume_at_the_pending_input() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = VmConfig::new().with_snapshot_path(dir.path().join("snap.bin"));
    // loop: in r0; out r0; jmp 0
    let memory = Memory::with_image(&[20, R0, 19, R0, 6, 0]).unwrap();
    let input = Cursor::new(&b"!save\na\n!set 5 1\n!load\nb\n!halt\n"[..]);
    let mut vm = VirtualMachine::new(config, memory, input, Vec::new());

    let outcome = vm.run().expect("execution failed");
    assert_eq!(outcome, RunOutcome::Halted(HaltReason::Debugger));
    // `!load` discarded the `jmp` operand patch
    assert_eq!(vm.memory().read(5).unwrap(), 0);
    assert_eq!(vm.into_output(), b"a\nb\n");
}

#[test]
fn restore_replaces_live_state() {
    let mut vm = machine(&[2, 7, 2, 8, 0]);
    vm.run().expect("execution failed");
    let saved = vm.state().clone();

    let mut other = machine(&[21, 21, 21]);
    other.restore(snapshot::decode(&snapshot::encode(&saved)).unwrap());
    assert_eq!(other.state(), &saved);
    assert_eq!(other.stack().as_slice(), &[7, 8]);
    assert_eq!(other.pc(), 5);
}
