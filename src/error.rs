//! Error taxonomy for every Lite³ operation.
//!
//! Covers:
//! - The [`Error`] enum with stable numeric discriminants
//! - `error_name()` string table and `from_code()` reverse mapping
//! - `Display` + `std::error::Error` impls
//! - Internal `fail!` / `dbg_trace!` diagnostics macros

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Error codes
// ─────────────────────────────────────────────────────────────────────────────

/// Failure cause of a Lite³ operation.
///
/// Discriminants are stable and may be exposed across a binary interface.
/// `AlreadyExists` is never produced by the engine itself; it is reserved for
/// layers built on top (the engine overwrites on key re-insertion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Error {
    /// A parameter failed validation: misaligned buffer, offset outside the
    /// buffer, container-type mismatch, type mismatch on a typed read, key
    /// containing a NUL byte, array index out of range, or probe exhaustion.
    InvalidArgument = 1,
    /// The key is absent after full hash probing.
    NotFound = 2,
    /// Reserved for collaborators layered on the engine.
    AlreadyExists = 3,
    /// A write would exceed the buffer capacity. Grow the buffer and retry.
    OutOfSpace = 4,
    /// The owning context already sits at the maximum buffer size.
    MessageTooLarge = 5,
    /// The buffer contents violate a structural invariant: unaligned or
    /// out-of-bounds child offset, value tag out of range, tree depth
    /// exceeded, or a length field extending past the buffer end.
    CorruptBuffer = 6,
    /// Filesystem failure in the JSON file decoder.
    Io = 7,
    /// Arithmetic overflow while computing a new capacity.
    Overflow = 8,
    /// The iterator observed a generation change; the buffer was mutated
    /// after the iterator was created.
    IteratorInvalidated = 9,
}

impl Error {
    /// Stable identifier string for this error kind.
    pub fn error_name(&self) -> &'static str {
        match self {
            Error::InvalidArgument => "ERROR_invalid_argument",
            Error::NotFound => "ERROR_not_found",
            Error::AlreadyExists => "ERROR_already_exists",
            Error::OutOfSpace => "ERROR_out_of_space",
            Error::MessageTooLarge => "ERROR_message_too_large",
            Error::CorruptBuffer => "ERROR_corrupt_buffer",
            Error::Io => "ERROR_io",
            Error::Overflow => "ERROR_overflow",
            Error::IteratorInvalidated => "ERROR_iterator_invalidated",
        }
    }

    /// Numeric discriminant of this error kind.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Converts a numeric discriminant back to an error variant.
    /// Returns `None` for out-of-range codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Error::InvalidArgument),
            2 => Some(Error::NotFound),
            3 => Some(Error::AlreadyExists),
            4 => Some(Error::OutOfSpace),
            5 => Some(Error::MessageTooLarge),
            6 => Some(Error::CorruptBuffer),
            7 => Some(Error::Io),
            8 => Some(Error::Overflow),
            9 => Some(Error::IteratorInvalidated),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

// ─────────────────────────────────────────────────────────────────────────────
// Diagnostics macros
// ─────────────────────────────────────────────────────────────────────────────

/// Bail out of the current function with `$err`, logging the message when the
/// `error-messages` feature is enabled.
macro_rules! fail {
    ($err:expr, $($msg:tt)*) => {{
        #[cfg(feature = "error-messages")]
        log::error!($($msg)*);
        return Err($err);
    }};
}
pub(crate) use fail;

/// Insertion trace, active only under the `debug-print` feature.
macro_rules! dbg_trace {
    ($($msg:tt)*) => {{
        #[cfg(feature = "debug-print")]
        log::debug!($($msg)*);
    }};
}
pub(crate) use dbg_trace;
