//! Error types for gateway frame construction.
//!
//! This module defines the [`Error`] enum for failures that can occur when
//! building frames and identifiers, plus the crate-wide [`Result`] alias.
//!
//! Note that runtime conditions of the safety profile itself (a denied
//! transmission, arbitration loss on the bit-bang bridge, retry exhaustion)
//! are *not* errors. They are expected outcomes and are reported through
//! ordinary result enums ([`TxDecision`](crate::TxDecision),
//! [`SendOutcome`](crate::SendOutcome)) so that no exception-like control
//! flow exists on the frame hot path.

use core::fmt;

/// Errors that can occur when constructing frames or identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A raw identifier value does not fit the selected format.
    ///
    /// Standard identifiers are 11 bits (max 0x7FF), extended identifiers
    /// are 29 bits (max 0x1FFF_FFFF).
    IdentifierOutOfRange {
        /// The raw value that was supplied
        raw: u32,
        /// The maximum value the format allows
        max: u32,
    },

    /// More payload bytes were supplied than a classic CAN frame can carry.
    PayloadTooLong {
        /// Number of bytes that were supplied
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IdentifierOutOfRange { raw, max } => {
                write!(
                    f,
                    "Identifier out of range: {raw:#x} exceeds format maximum {max:#x}"
                )
            }
            Error::PayloadTooLong { len } => {
                write!(f, "Payload too long: {len} bytes, classic CAN carries at most 8")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A specialized Result type for frame construction.
///
/// This is defined as `core::result::Result<T, Error>` for convenience.
pub type Result<T> = core::result::Result<T, Error>;
