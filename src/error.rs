use std::fmt;

/// Fatal conditions that stop a program run.
///
/// Every variant except [`TapeAllocation`](BfError::TapeAllocation) carries
/// the instruction address (an index into the filtered
/// [`Program`](crate::Program)) at which the run stopped. The error never
/// formats anything for end users; callers are expected to build their own
/// message from [`kind`](BfError::kind), [`instruction`](BfError::instruction)
/// and [`pointer`](BfError::pointer).
#[derive(Debug, thiserror::Error)]
pub enum BfError {
    /// A `[` with no matching `]`. Raised while preprocessing.
    #[error("unmatched '[' at instruction {ip}")]
    UnmatchedLoopStart { ip: usize },

    /// A `]` reached with no open loop on the call stack.
    #[error("unmatched ']' at instruction {ip}")]
    UnmatchedLoopEnd { ip: usize },

    /// The cell pointer left the tape in bounded mode.
    #[error("pointer out of range at instruction {ip} (ptr={ptr})")]
    PointerOutOfRange { ip: usize, ptr: isize },

    /// Reading from the input or writing to the output failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// The tape could not be allocated. Raised before execution begins.
    #[error("cannot allocate a tape of {len} cells")]
    TapeAllocation { len: usize },
}

/// The kind of a [`BfError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnmatchedLoopStart,
    UnmatchedLoopEnd,
    PointerOutOfRange,
    Io,
    TapeAllocation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnmatchedLoopStart => "unmatched loop start",
            ErrorKind::UnmatchedLoopEnd => "unmatched loop end",
            ErrorKind::PointerOutOfRange => "pointer out of range",
            ErrorKind::Io => "i/o failure",
            ErrorKind::TapeAllocation => "tape allocation failure",
        };
        f.write_str(name)
    }
}

impl BfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BfError::UnmatchedLoopStart { .. } => ErrorKind::UnmatchedLoopStart,
            BfError::UnmatchedLoopEnd { .. } => ErrorKind::UnmatchedLoopEnd,
            BfError::PointerOutOfRange { .. } => ErrorKind::PointerOutOfRange,
            BfError::Io { .. } => ErrorKind::Io,
            BfError::TapeAllocation { .. } => ErrorKind::TapeAllocation,
        }
    }

    /// Address of the faulting instruction, if execution got that far.
    pub fn instruction(&self) -> Option<usize> {
        match self {
            BfError::UnmatchedLoopStart { ip }
            | BfError::UnmatchedLoopEnd { ip }
            | BfError::PointerOutOfRange { ip, .. }
            | BfError::Io { ip, .. } => Some(*ip),
            BfError::TapeAllocation { .. } => None,
        }
    }

    /// The invalid cell pointer value, for [`ErrorKind::PointerOutOfRange`] only.
    pub fn pointer(&self) -> Option<isize> {
        match self {
            BfError::PointerOutOfRange { ptr, .. } => Some(*ptr),
            _ => None,
        }
    }
}
