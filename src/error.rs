//! Error types for the kernel library.
//!
//! Grounded on `command.rs`'s `CommandError` (a flat struct of named error
//! constants returned from fallible builder methods): every kernel validates
//! its build-time parameter block in a `new`/`try_new` constructor and
//! returns one of these before any stream element is ever touched. Once a
//! kernel value exists, its `push`/`step` methods are infallible, matching
//! spec §7's "the core produces no run-time errors by design".

use thiserror::Error;

/// Failure of a kernel's build-time parameter block (spec §7,
/// "static-parameter errors" and "shape errors").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("vector width {0} is not one of {{1, 2, 4, 8}}")]
    BadVectorWidth(u32),

    #[error("{dividend} is not evenly divisible by {divisor} ({what})")]
    NotDivisible {
        what: &'static str,
        dividend: u64,
        divisor: u64,
    },

    #[error("shift {shift} exceeds the {bits}-bit width of the type")]
    ShiftOutOfRange { shift: u32, bits: u32 },

    #[error("colour conversion from {from:?} to {to:?} is not supported")]
    UnsupportedColorConversion { from: &'static str, to: &'static str },

    #[error("operation requires an unsigned scalar type, got a signed one")]
    SignedNotAllowed,

    #[error("stride {stride} is out of range for kernel size {kernel}")]
    StrideOutOfRange { stride: u32, kernel: u32 },

    #[error("output size {got} must not exceed input size {max} ({what})")]
    OutputTooLarge {
        what: &'static str,
        got: u32,
        max: u32,
    },

    #[error("{what} must be greater than zero")]
    MustBePositive { what: &'static str },

    #[error("{what}: {detail}")]
    Other {
        what: &'static str,
        detail: &'static str,
    },
}

/// Failure of the PGM reader/writer external collaborator (spec §6).
#[derive(Debug, Error)]
pub enum PgmError {
    #[error("bad magic bytes, expected P5")]
    BadMagic,
    #[error("could not parse PGM header: {0}")]
    HeaderParse(&'static str),
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },
    #[error("short write: wrote {wrote} of {expected} bytes")]
    ShortWrite { wrote: usize, expected: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
