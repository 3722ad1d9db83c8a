//! Source preprocessing.
//!
//! Raw source text is reduced to the eight instruction characters `><+-.,[]`
//! and every `[` is paired with its matching `]` ahead of execution, so the
//! executor can skip a loop body in constant time.

use std::fmt;

use tracing::debug;

use crate::BfError;

/// One of the eight instructions of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    MoveRight,
    MoveLeft,
    Increment,
    Decrement,
    Output,
    Input,
    LoopStart,
    LoopEnd,
}

impl Instruction {
    /// Map a source character to its instruction, if it is one.
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '>' => Instruction::MoveRight,
            '<' => Instruction::MoveLeft,
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            '[' => Instruction::LoopStart,
            ']' => Instruction::LoopEnd,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Instruction::MoveRight => '>',
            Instruction::MoveLeft => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopStart => '[',
            Instruction::LoopEnd => ']',
        }
    }
}

/// A preprocessed program: the filtered instruction sequence plus its jump table.
///
/// Instruction addresses are indices into [`instructions`](Program::instructions)
/// and stay stable for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    // jumps[i] holds the address of the matching ']' when instructions[i] is '['.
    jumps: Vec<Option<usize>>,
}

impl Program {
    /// Filter `source` down to instructions and build the jump table.
    ///
    /// Characters outside the instruction set are dropped silently. A `[`
    /// without a matching `]` fails with [`BfError::UnmatchedLoopStart`]
    /// naming the leftmost such `[`. A stray `]` is not an error here; it
    /// gets no jump table entry and is caught when executed.
    pub fn parse(source: &str) -> Result<Self, BfError> {
        let instructions: Vec<Instruction> = source.chars().filter_map(Instruction::from_char).collect();

        let mut jumps: Vec<Option<usize>> = vec![None; instructions.len()];
        let mut open: Vec<usize> = Vec::new();
        for (i, instr) in instructions.iter().enumerate() {
            match instr {
                Instruction::LoopStart => open.push(i),
                Instruction::LoopEnd => {
                    if let Some(start) = open.pop() {
                        jumps[start] = Some(i);
                    }
                }
                _ => {}
            }
        }

        if let Some(&unmatched) = open.first() {
            return Err(BfError::UnmatchedLoopStart { ip: unmatched });
        }

        debug!(
            instructions = instructions.len(),
            loops = jumps.iter().filter(|j| j.is_some()).count(),
            "program preprocessed"
        );

        Ok(Self { instructions, jumps })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Address of the `]` matching the `[` at `addr`.
    pub fn jump_target(&self, addr: usize) -> Option<usize> {
        self.jumps.get(addr).copied().flatten()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instructions {
            write!(f, "{}", instr.as_char())?;
        }
        Ok(())
    }
}
