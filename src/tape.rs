use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::BfError;

/// Default number of cells on the tape.
pub const DEFAULT_TAPE_LENGTH: NonZeroUsize = match NonZeroUsize::new(65_536) {
    Some(n) => n,
    None => unreachable!(),
};

/// How the cell pointer behaves at the ends of the tape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressingMode {
    /// Moving past either end is a fatal error.
    #[default]
    Bounded,
    /// Moving past either end wraps around to the other.
    Circular,
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressingMode::Bounded => write!(f, "bounded"),
            AddressingMode::Circular => write!(f, "circular"),
        }
    }
}

impl FromStr for AddressingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounded" => Ok(AddressingMode::Bounded),
            "circular" => Ok(AddressingMode::Circular),
            other => Err(format!("unknown addressing mode '{other}' (expected bounded or circular)")),
        }
    }
}

/// The pointer value a bounded move would have produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    pub ptr: isize,
}

/// A fixed-length tape of byte cells with a single cell pointer.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
    mode: AddressingMode,
}

impl Tape {
    /// Allocate a zeroed tape of `len` cells.
    ///
    /// Fails with [`BfError::TapeAllocation`] instead of aborting when the
    /// allocator cannot provide `len` bytes.
    pub fn new(len: NonZeroUsize, mode: AddressingMode) -> Result<Self, BfError> {
        let len = len.get();
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| BfError::TapeAllocation { len })?;
        cells.resize(len, 0);
        Ok(Self {
            cells,
            pointer: 0,
            mode,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Value of the current cell.
    pub fn get(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn set(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    pub fn increment(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_sub(1);
    }

    /// Move one cell right. The pointer is left untouched on error.
    pub fn move_right(&mut self) -> Result<(), OutOfRange> {
        let next = self.pointer + 1;
        if next < self.cells.len() {
            self.pointer = next;
            return Ok(());
        }
        match self.mode {
            AddressingMode::Circular => {
                self.pointer = 0;
                Ok(())
            }
            AddressingMode::Bounded => Err(OutOfRange { ptr: next as isize }),
        }
    }

    /// Move one cell left. The pointer is left untouched on error.
    pub fn move_left(&mut self) -> Result<(), OutOfRange> {
        if let Some(prev) = self.pointer.checked_sub(1) {
            self.pointer = prev;
            return Ok(());
        }
        match self.mode {
            AddressingMode::Circular => {
                self.pointer = self.cells.len() - 1;
                Ok(())
            }
            AddressingMode::Bounded => Err(OutOfRange { ptr: -1 }),
        }
    }
}
