//! A tape-machine Brainfuck interpreter library.
//!
//! Programs run on a fixed-length tape of byte cells (65,536 by default)
//! with a single cell pointer.
//!
//! Features and behaviors:
//! - Any character outside `><+-.,[]` is ignored, so programs may carry comments.
//! - Every `[` is paired with its `]` before execution starts; a `[` with no
//!   partner is reported without running anything.
//! - A `]` reached with no open loop stops the run with an error.
//! - Cells wrap: 255 + 1 is 0 and 0 - 1 is 255.
//! - Bounded addressing (the default) treats moving off either end of the
//!   tape as an error; circular addressing wraps around instead.
//! - `,` reads one byte; at end of input the cell is set to 0 unless another
//!   [`EofBehavior`] is chosen.
//! - `.` writes the current cell as one raw byte.
//!
//! Quick start:
//!
//! ```
//! use bfrun::MachineConfig;
//!
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let mut out = Vec::new();
//! bfrun::run(code, &MachineConfig::default(), std::io::empty(), &mut out).expect("program should run");
//! assert_eq!(out, b"Hello World!\n");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
mod error;
pub mod executor;
pub mod program;
pub mod tape;

pub use error::{BfError, ErrorKind};
pub use executor::{EofBehavior, Executor, MachineConfig, RunSummary, run};
pub use program::{Instruction, Program};
pub use tape::{AddressingMode, DEFAULT_TAPE_LENGTH, Tape};
