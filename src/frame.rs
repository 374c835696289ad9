//! Gateway frame model and arbitration identifier classification.
//!
//! A [`GatewayFrame`] is the transient unit handed into the safety hooks: an
//! arbitration identifier, the bus it arrived on (or is destined for), and
//! the payload exposed as two 32-bit words in original bit order.
//!
//! # Identifier namespaces
//!
//! Standard (11-bit) and extended (29-bit) identifiers are disjoint
//! namespaces: a standard 0x135 and an extended 0x135 refer to different
//! messages. [`FrameId`] keeps the two spaces apart as enum variants, so any
//! lookup keyed on a `FrameId` can never cross-match numerically equal
//! values. The format is always taken from an explicit flag or variant,
//! never inferred from the numeric value.
//!
//! # Payload word layout
//!
//! The payload is carried as two little-endian 32-bit words: `data_lo` holds
//! bytes 0..=3 and `data_hi` holds bytes 4..=7. This matches the mailbox
//! register layout the per-signal bit offsets in [`crate::signals`] were
//! defined against.

use crate::error::{Error, Result};

/// Maximum value of a standard (11-bit) identifier.
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Maximum value of an extended (29-bit) identifier.
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// A CAN arbitration identifier, tagged by format.
///
/// The two variants are separate lookup domains; `Standard(0x135)` and
/// `Extended(0x135)` never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameId {
    /// Standard frame format, 11-bit identifier.
    Standard(u16),
    /// Extended frame format, 29-bit identifier.
    Extended(u32),
}

impl FrameId {
    /// Create a standard (11-bit) identifier.
    pub fn standard(raw: u32) -> Result<Self> {
        if raw > MAX_STANDARD_ID {
            return Err(Error::IdentifierOutOfRange {
                raw,
                max: MAX_STANDARD_ID,
            });
        }
        Ok(FrameId::Standard(raw as u16))
    }

    /// Create an extended (29-bit) identifier.
    pub fn extended(raw: u32) -> Result<Self> {
        if raw > MAX_EXTENDED_ID {
            return Err(Error::IdentifierOutOfRange {
                raw,
                max: MAX_EXTENDED_ID,
            });
        }
        Ok(FrameId::Extended(raw))
    }

    /// The raw identifier value, right-aligned.
    #[inline]
    pub const fn raw(self) -> u32 {
        match self {
            FrameId::Standard(id) => id as u32,
            FrameId::Extended(id) => id,
        }
    }

    /// Returns true for the extended (29-bit) format.
    #[inline]
    pub const fn is_extended(self) -> bool {
        matches!(self, FrameId::Extended(_))
    }

    /// Number of identifier bits on the wire: 11 or 29.
    #[inline]
    pub const fn bit_count(self) -> u8 {
        match self {
            FrameId::Standard(_) => 11,
            FrameId::Extended(_) => 29,
        }
    }
}

#[cfg(feature = "can")]
impl From<embedded_can::Id> for FrameId {
    fn from(id: embedded_can::Id) -> Self {
        match id {
            embedded_can::Id::Standard(id) => FrameId::Standard(id.as_raw()),
            embedded_can::Id::Extended(id) => FrameId::Extended(id.as_raw()),
        }
    }
}

#[cfg(feature = "can")]
impl From<FrameId> for embedded_can::Id {
    fn from(id: FrameId) -> Self {
        match id {
            // Raw values are range-checked at construction, so the
            // embedded-can constructors cannot fail here.
            FrameId::Standard(raw) => embedded_can::Id::Standard(
                embedded_can::StandardId::new(raw).unwrap_or(embedded_can::StandardId::ZERO),
            ),
            FrameId::Extended(raw) => embedded_can::Id::Extended(
                embedded_can::ExtendedId::new(raw).unwrap_or(embedded_can::ExtendedId::ZERO),
            ),
        }
    }
}

/// A transient CAN frame as seen by the safety hooks.
///
/// Owned by the caller for the duration of a hook invocation. Carries the
/// tagged identifier, the origin/destination bus number, and the payload as
/// two 32-bit words (see the module docs for the word layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GatewayFrame {
    id: FrameId,
    bus: u8,
    data_lo: u32,
    data_hi: u32,
}

impl GatewayFrame {
    /// Create a frame from pre-packed payload words.
    #[inline]
    pub const fn new(id: FrameId, bus: u8, data_lo: u32, data_hi: u32) -> Self {
        Self {
            id,
            bus,
            data_lo,
            data_hi,
        }
    }

    /// Create a frame from payload bytes (up to 8).
    ///
    /// Bytes 0..=3 pack little-endian into the low word, bytes 4..=7 into
    /// the high word; missing bytes are zero.
    pub fn from_bytes(id: FrameId, bus: u8, data: &[u8]) -> Result<Self> {
        if data.len() > 8 {
            return Err(Error::PayloadTooLong { len: data.len() });
        }
        let mut bytes = [0u8; 8];
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self {
            id,
            bus,
            data_lo: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data_hi: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Build a gateway frame from any embedded-can frame plus its bus.
    #[cfg(feature = "can")]
    pub fn from_can_frame<F: embedded_can::Frame>(frame: &F, bus: u8) -> Result<Self> {
        Self::from_bytes(frame.id().into(), bus, frame.data())
    }

    /// The tagged arbitration identifier.
    #[inline]
    pub const fn id(&self) -> FrameId {
        self.id
    }

    /// The origin bus (inbound) or destination bus (outbound).
    #[inline]
    pub const fn bus(&self) -> u8 {
        self.bus
    }

    /// Payload bytes 0..=3 as a little-endian word.
    #[inline]
    pub const fn data_lo(&self) -> u32 {
        self.data_lo
    }

    /// Payload bytes 4..=7 as a little-endian word.
    #[inline]
    pub const fn data_hi(&self) -> u32 {
        self.data_hi
    }
}
