//! Instruction dispatch over a fixed-size tape.

use std::fmt;
use std::io::{self, Read, Write};
use std::num::NonZeroUsize;
use std::str::FromStr;

use tracing::debug;

use crate::program::{Instruction, Program};
use crate::tape::{AddressingMode, DEFAULT_TAPE_LENGTH, Tape};
use crate::BfError;

/// What `,` stores when the input stream is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EofBehavior {
    /// Store 0.
    #[default]
    Zero,
    /// Store 255, i.e. an end-of-stream value of -1 narrowed to a byte.
    Max,
    /// Leave the current cell as it is.
    Unchanged,
}

impl fmt::Display for EofBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofBehavior::Zero => write!(f, "zero"),
            EofBehavior::Max => write!(f, "max"),
            EofBehavior::Unchanged => write!(f, "unchanged"),
        }
    }
}

impl FromStr for EofBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" => Ok(EofBehavior::Zero),
            "max" | "255" | "-1" => Ok(EofBehavior::Max),
            "unchanged" | "keep" => Ok(EofBehavior::Unchanged),
            other => Err(format!("unknown eof policy '{other}' (expected zero, max or unchanged)")),
        }
    }
}

/// Machine parameters fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    pub tape_length: NonZeroUsize,
    pub addressing: AddressingMode,
    pub eof: EofBehavior,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            tape_length: DEFAULT_TAPE_LENGTH,
            addressing: AddressingMode::Bounded,
            eof: EofBehavior::Zero,
        }
    }
}

/// Final machine state of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub cell_pointer: usize,
}

/// Executes one [`Program`] against its own tape.
///
/// The executor maintains:
/// - the instruction pointer into the program,
/// - a tape of `tape_length` zeroed cells and its cell pointer,
/// - a call stack of the `[` addresses of the loops currently being repeated.
pub struct Executor<'p> {
    program: &'p Program,
    tape: Tape,
    call_stack: Vec<usize>,
    eof: EofBehavior,
    ip: usize,
    steps: u64,
}

impl<'p> Executor<'p> {
    /// Set up a fresh machine for `program`, allocating its tape.
    pub fn new(program: &'p Program, config: &MachineConfig) -> Result<Self, BfError> {
        Ok(Self {
            program,
            tape: Tape::new(config.tape_length, config.addressing)?,
            call_stack: Vec::new(),
            eof: config.eof,
            ip: 0,
            steps: 0,
        })
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn cell_pointer(&self) -> usize {
        self.tape.pointer()
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Run the program to completion.
    ///
    /// `.` writes each byte to `output` as it is produced and `,` pulls one
    /// byte at a time from `input`. Pending output is flushed before every
    /// read and before returning, whether or not the run succeeded.
    pub fn run<R: Read, W: Write>(&mut self, mut input: R, mut output: W) -> Result<(), BfError> {
        debug!(
            tape_length = self.tape.len(),
            mode = %self.tape.mode(),
            eof = %self.eof,
            "run starting"
        );

        let result = self.execute(&mut input, &mut output);
        let flushed = output
            .flush()
            .map_err(|source| BfError::Io { ip: self.ip, source });

        debug!(steps = self.steps, ok = result.is_ok(), "run finished");
        result.and(flushed)
    }

    fn execute<R: Read, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<(), BfError> {
        let code = self.program.instructions();

        while self.ip < code.len() {
            let ip = self.ip;
            match code[ip] {
                Instruction::MoveRight => {
                    self.tape
                        .move_right()
                        .map_err(|e| BfError::PointerOutOfRange { ip, ptr: e.ptr })?;
                }
                Instruction::MoveLeft => {
                    self.tape
                        .move_left()
                        .map_err(|e| BfError::PointerOutOfRange { ip, ptr: e.ptr })?;
                }
                Instruction::Increment => self.tape.increment(),
                Instruction::Decrement => self.tape.decrement(),
                Instruction::Output => {
                    output
                        .write_all(&[self.tape.get()])
                        .map_err(|source| BfError::Io { ip, source })?;
                }
                Instruction::Input => {
                    output.flush().map_err(|source| BfError::Io { ip, source })?;
                    match read_byte(input).map_err(|source| BfError::Io { ip, source })? {
                        Some(b) => self.tape.set(b),
                        None => match self.eof {
                            EofBehavior::Zero => self.tape.set(0),
                            EofBehavior::Max => self.tape.set(u8::MAX),
                            EofBehavior::Unchanged => {}
                        },
                    }
                }
                Instruction::LoopStart => {
                    if self.tape.get() == 0 {
                        // Parsing guarantees every '[' has a partner.
                        let Some(end) = self.program.jump_target(ip) else {
                            return Err(BfError::UnmatchedLoopStart { ip });
                        };
                        self.ip = end;
                    } else {
                        self.call_stack.push(ip);
                    }
                }
                Instruction::LoopEnd => {
                    if self.tape.get() == 0 {
                        if self.call_stack.pop().is_none() {
                            return Err(BfError::UnmatchedLoopEnd { ip });
                        }
                    } else {
                        let Some(&start) = self.call_stack.last() else {
                            return Err(BfError::UnmatchedLoopEnd { ip });
                        };
                        self.ip = start;
                    }
                }
            }

            self.steps += 1;
            self.ip += 1;
        }

        Ok(())
    }
}

/// Read exactly one byte, or `None` at end of input.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Preprocess `source` and run it on a fresh machine.
pub fn run<R: Read, W: Write>(
    source: &str,
    config: &MachineConfig,
    input: R,
    output: W,
) -> Result<RunSummary, BfError> {
    let program = Program::parse(source)?;
    let mut executor = Executor::new(&program, config)?;
    executor.run(input, output)?;
    Ok(RunSummary {
        steps: executor.steps(),
        cell_pointer: executor.cell_pointer(),
    })
}
