use std::num::NonZeroUsize;

use bfrun::{AddressingMode, BfError, ErrorKind, Executor, MachineConfig, Program};

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn machine(len: usize, addressing: AddressingMode) -> MachineConfig {
    MachineConfig {
        tape_length: NonZeroUsize::new(len).expect("non-zero tape"),
        addressing,
        ..MachineConfig::default()
    }
}

fn output_of(code: &str, config: &MachineConfig, input: &[u8]) -> Result<Vec<u8>, BfError> {
    let mut out = Vec::new();
    bfrun::run(code, config, input, &mut out)?;
    Ok(out)
}

#[test]
fn hello_world_prints_exactly() {
    let out = output_of(HELLO_WORLD, &MachineConfig::default(), b"").unwrap();
    assert_eq!(out, b"Hello World!\n");
}

#[test]
fn commentary_does_not_change_behavior() {
    let plain = ",[.,]";
    let commented = "read a byte: ,\n while nonzero [ echo it . and read again , ]\n";

    let a = output_of(plain, &MachineConfig::default(), b"tape").unwrap();
    let b = output_of(commented, &MachineConfig::default(), b"tape").unwrap();
    assert_eq!(a, b);
    assert_eq!(a, b"tape");
}

#[test]
fn commented_hello_world_matches_plain() {
    let noisy: String = HELLO_WORLD
        .chars()
        .flat_map(|c| [c, ' ', 'x', '\n'])
        .collect();
    let out = output_of(&noisy, &MachineConfig::default(), b"").unwrap();
    assert_eq!(out, b"Hello World!\n");
}

#[test]
fn increment_wraps_after_256() {
    let code = format!("{}.", "+".repeat(256));
    assert_eq!(output_of(&code, &MachineConfig::default(), b"").unwrap(), vec![0]);
}

#[test]
fn decrement_of_fresh_cell_is_255() {
    assert_eq!(output_of("-.", &MachineConfig::default(), b"").unwrap(), vec![255]);
}

#[test]
fn empty_loop_on_zero_cell_is_a_no_op() {
    let program = Program::parse("[]").unwrap();
    let mut executor = Executor::new(&program, &MachineConfig::default()).unwrap();
    executor.run(&b""[..], Vec::new()).unwrap();
    assert_eq!(executor.steps(), 1);
    assert_eq!(executor.cell_pointer(), 0);
}

#[test]
fn bounded_single_cell_tape_rejects_move_right() {
    let err = output_of(">", &machine(1, AddressingMode::Bounded), b"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PointerOutOfRange);
    assert_eq!(err.instruction(), Some(0));
    assert_eq!(err.pointer(), Some(1));
}

#[test]
fn bounded_fault_stops_before_later_instructions() {
    let program = Program::parse("+>+").unwrap();
    let mut executor = Executor::new(&program, &machine(1, AddressingMode::Bounded)).unwrap();
    let err = executor.run(&b""[..], Vec::new()).unwrap_err();
    assert_eq!(err.instruction(), Some(1));
    assert_eq!(executor.tape().cells(), &[1]);
    assert_eq!(executor.steps(), 1);
}

#[test]
fn circular_tape_length_moves_return_home() {
    let summary = bfrun::run(">>>", &machine(3, AddressingMode::Circular), &b""[..], Vec::new()).unwrap();
    assert_eq!(summary.cell_pointer, 0);
    assert_eq!(summary.steps, 3);
}

#[test]
fn circular_tape_shares_cells_across_the_seam() {
    // '<' from cell 0 lands on the last cell, '>' wraps back to cell 0.
    let out = output_of("<+++>.<.", &machine(4, AddressingMode::Circular), b"").unwrap();
    assert_eq!(out, vec![0, 3]);
}

#[test]
fn unmatched_loop_start_fails_before_running() {
    let mut out = Vec::new();
    let err = bfrun::run(".[[]", &MachineConfig::default(), &b""[..], &mut out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnmatchedLoopStart);
    assert_eq!(err.instruction(), Some(1));
    assert!(out.is_empty(), "nothing may run when preprocessing fails");
}

#[test]
fn unmatched_loop_end_is_a_runtime_error() {
    let mut out = Vec::new();
    let err = bfrun::run("+.]", &MachineConfig::default(), &b""[..], &mut out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnmatchedLoopEnd);
    assert_eq!(err.instruction(), Some(2));
    assert_eq!(out, vec![1]);
}

#[test]
fn input_at_end_of_stream_uses_policy() {
    let mut config = MachineConfig::default();
    assert_eq!(output_of("+,.", &config, b"").unwrap(), vec![0]);

    config.eof = bfrun::EofBehavior::Max;
    assert_eq!(output_of("+,.", &config, b"").unwrap(), vec![255]);

    config.eof = bfrun::EofBehavior::Unchanged;
    assert_eq!(output_of("+,.", &config, b"").unwrap(), vec![1]);
}

#[test]
fn default_tape_is_65536_cells() {
    let program = Program::parse("").unwrap();
    let executor = Executor::new(&program, &MachineConfig::default()).unwrap();
    assert_eq!(executor.tape().len(), 65_536);
}

#[test]
fn last_cell_of_default_tape_is_reachable() {
    let code = format!("{}+.", ">".repeat(65_535));
    assert_eq!(output_of(&code, &MachineConfig::default(), b"").unwrap(), vec![1]);

    let code = format!("{}>", ">".repeat(65_535));
    let err = output_of(&code, &MachineConfig::default(), b"").unwrap_err();
    assert_eq!(err.pointer(), Some(65_536));
}
