//! Error types for genexpr_core.
//!
//! Instruction-level failures never surface here; they are reported through
//! [`crate::hardware::Step`]. These variants cover instruction-set loading,
//! memory bounds, and structural invariant violations found by the
//! consistency check.

use thiserror::Error;

/// Main error type for genexpr_core operations.
#[derive(Error, Debug)]
pub enum HardwareError {
    /// A memory space was asked to grow past its bound or shrink to nothing
    #[error("Memory size {requested} outside 1..={max}")]
    MemoryBound { requested: usize, max: usize },

    /// Instruction set text could not be parsed
    #[error("Instruction set line {line}: {message}")]
    InstSetParse { line: usize, message: String },

    /// Name not present in the instruction library or set
    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),

    /// A programid's stored index disagrees with its position
    #[error("Programid at position {position} stores index {stored}")]
    IndexMismatch { position: usize, stored: usize },

    /// A contact counter disagrees with the heads actually resting on it
    #[error("Programid {index} counts {counted} contacting heads but {actual} rest on it")]
    ContactMismatch {
        index: usize,
        counted: usize,
        actual: usize,
    },

    /// A head references a programid that no longer exists
    #[error("Head {head} of programid {owner} references missing programid {space}")]
    DanglingHead {
        owner: usize,
        head: usize,
        space: usize,
    },

    /// The collection outgrew the configured bound
    #[error("{live} programids exceed capacity {max}")]
    CapacityExceeded { live: usize, max: usize },

    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<HardwareError>,
    },
}

/// Result type alias for genexpr_core operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

impl HardwareError {
    /// Creates a new instruction-set parse error.
    #[must_use]
    pub fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Self::InstSetParse {
            line,
            message: message.into(),
        }
    }

    /// Creates a new unknown instruction error.
    #[must_use]
    pub fn unknown<S: Into<String>>(name: S) -> Self {
        Self::UnknownInstruction(name.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
