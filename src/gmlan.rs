//! Single-wire GMLAN bit-bang bridge.
//!
//! The gateway's hardware transceiver cannot address the secondary GMLAN
//! bus, so approved frames destined for it are serialized by toggling the
//! transceiver's discrete lines in software. The physical medium has no
//! hardware-mediated arbitration: each attempt runs inside a critical
//! section (interrupts disabled) because any timing skew corrupts the
//! encoded frame, and every bit is read back to detect a competing writer.
//!
//! # Attempt protocol
//!
//! One attempt walks the [`Segment`] state machine: identifier (29 bits for
//! extended format, 11 for standard, MSB first), then data word A (32 bits),
//! then data word B (32 bits, standard-format frames only, an inherited
//! asymmetry of this network's framing). Per bit: drive the line to
//! the bit's level, switch it to output, switch back to input, read it back.
//! A high (recessive) bit that reads back low means another writer drove a
//! dominant level and won arbitration; the attempt aborts immediately.
//!
//! # Caller contract
//!
//! [`ArbitrationLoss`] always leaves the lines restored to
//! transceiver-controlled mode and interrupts re-enabled (the transmit
//! window guard releases on every exit path). A retry re-runs the whole attempt
//! from identifier bit 0; there is no partial resume. [`GmlanBridge::send`]
//! drives the bounded retry loop and reports a distinguishable
//! [`SendOutcome::Dropped`] when all attempts fail.

use crate::frame::GatewayFrame;

/// Upper bound on send attempts per frame. No backoff between attempts.
pub const MAX_SEND_ATTEMPTS: u32 = 200;

/// The two discrete lines of the secondary-bus transceiver.
///
/// Only [`Line::Tx`] is toggled during bit-banging; both lines are handed
/// back to the transceiver when an attempt ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// Transmit line, driven and sensed during bit-banging.
    Tx,
    /// Receive line, left to the transceiver.
    Rx,
}

/// Direction a line is switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Drive the line to the level previously set.
    Output,
    /// Release the line and sense its level.
    Input,
}

/// Platform surface for the bit-bang bridge.
///
/// Implemented against the target's GPIO and interrupt controller; tests
/// implement it with a scripted mock. `line_is_high` takes `&mut self`
/// because sensing may touch peripheral registers.
pub trait GmlanIo {
    /// Latch the level the line will drive when switched to output.
    fn set_line(&mut self, line: Line, high: bool);

    /// Switch a line between output-drive and input-sense mode.
    fn set_mode(&mut self, line: Line, mode: LineMode);

    /// Sense the current level of a line (input mode).
    fn line_is_high(&mut self, line: Line) -> bool;

    /// Hand both lines back to the hardware transceiver.
    fn restore_transceiver(&mut self);

    /// Disable interrupts. Bit timing must not be preempted.
    fn enter_critical_section(&mut self);

    /// Re-enable interrupts.
    fn exit_critical_section(&mut self);
}

/// Which part of the frame an attempt was serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// The arbitration identifier (11 or 29 bits).
    Identifier,
    /// First data word, 32 bits, always sent.
    WordA,
    /// Second data word, standard-format frames only.
    WordB,
}

/// Another writer drove a dominant level while this transmitter intended a
/// recessive one. Expected and recoverable; the caller retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitrationLoss {
    /// Segment being serialized when the loss was detected.
    pub segment: Segment,
    /// Bit index within the segment, MSB first, starting at 0.
    pub bit: u8,
}

/// Outcome of a bounded-retry send.
///
/// `Dropped` is deliberately distinguishable from both `Sent` and
/// never-attempted: the frame was approved for the secondary bus but never
/// made it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SendOutcome {
    /// The frame went out without contention.
    Sent {
        /// Attempts used, including the successful one (1-based).
        attempts: u32,
    },
    /// Every attempt lost arbitration; the frame never reached the bus.
    Dropped {
        /// Attempts used (always [`MAX_SEND_ATTEMPTS`]).
        attempts: u32,
    },
}

impl SendOutcome {
    /// Returns true if the frame reached the bus.
    #[inline]
    pub const fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent { .. })
    }
}

/// Scoped transmit window: critical section plus line ownership.
///
/// Opening the window disables interrupts; dropping it restores the lines
/// to transceiver-controlled mode and re-enables interrupts, on success and
/// on arbitration loss alike.
struct TxWindow<'a, IO: GmlanIo> {
    io: &'a mut IO,
}

impl<'a, IO: GmlanIo> TxWindow<'a, IO> {
    fn open(io: &'a mut IO) -> Self {
        io.enter_critical_section();
        Self { io }
    }

    /// Shift out the top `bits` bits of `word`, MSB first.
    fn shift_out(&mut self, word: u32, bits: u8, segment: Segment) -> Result<(), ArbitrationLoss> {
        let mut word = word;
        for bit in 0..bits {
            let high = word & 0x8000_0000 != 0;
            self.io.set_line(Line::Tx, high);
            self.io.set_mode(Line::Tx, LineMode::Output);
            self.io.set_mode(Line::Tx, LineMode::Input);
            // Recessive intended but dominant sensed: someone else won
            if high && !self.io.line_is_high(Line::Tx) {
                return Err(ArbitrationLoss { segment, bit });
            }
            word <<= 1;
        }
        Ok(())
    }
}

impl<IO: GmlanIo> Drop for TxWindow<'_, IO> {
    fn drop(&mut self) {
        self.io.restore_transceiver();
        self.io.exit_critical_section();
    }
}

/// Software serializer for the secondary GMLAN bus.
pub struct GmlanBridge<IO: GmlanIo> {
    io: IO,
}

impl<IO: GmlanIo> GmlanBridge<IO> {
    /// Create a bridge over the given platform surface.
    pub fn new(io: IO) -> Self {
        Self { io }
    }

    /// Access the platform surface.
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Consume the bridge, returning the platform surface.
    pub fn into_inner(self) -> IO {
        self.io
    }

    /// Run a single serialization attempt.
    ///
    /// On `Err` the lines are already restored and interrupts re-enabled; a
    /// subsequent attempt starts cleanly from identifier bit 0.
    pub fn attempt(&mut self, frame: &GatewayFrame) -> Result<(), ArbitrationLoss> {
        let mut window = TxWindow::open(&mut self.io);

        let id = frame.id();
        let bits = id.bit_count();
        let mut segment = Segment::Identifier;
        loop {
            match segment {
                Segment::Identifier => {
                    window.shift_out(id.raw() << (32 - bits as u32), bits, segment)?;
                    segment = Segment::WordA;
                }
                Segment::WordA => {
                    window.shift_out(frame.data_lo(), 32, segment)?;
                    if id.is_extended() {
                        // Extended identifiers leave no room for word B
                        break;
                    }
                    segment = Segment::WordB;
                }
                Segment::WordB => {
                    window.shift_out(frame.data_hi(), 32, segment)?;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Send a frame with bounded retry, up to [`MAX_SEND_ATTEMPTS`].
    pub fn send(&mut self, frame: &GatewayFrame) -> SendOutcome {
        for attempt in 1..=MAX_SEND_ATTEMPTS {
            if self.attempt(frame).is_ok() {
                return SendOutcome::Sent { attempts: attempt };
            }
        }
        #[cfg(feature = "log")]
        log::warn!(
            "secondary-bus frame {:?} dropped after {} attempts",
            frame.id(),
            MAX_SEND_ATTEMPTS
        );
        SendOutcome::Dropped {
            attempts: MAX_SEND_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameId;

    /// Scripted mock: records every operation and yields a dominant (low)
    /// readback at chosen sense indices. Only recessive bits are sensed by
    /// the bridge, so sense indices count recessive bits, not wire bits.
    struct MockIo {
        stomp_senses: Vec<u32>,
        senses: u32,
        driven_levels: Vec<bool>,
        critical_depth: i32,
        enters: u32,
        exits: u32,
        restores: u32,
        restored_last: bool,
    }

    impl MockIo {
        fn clean() -> Self {
            Self {
                stomp_senses: Vec::new(),
                senses: 0,
                driven_levels: Vec::new(),
                critical_depth: 0,
                enters: 0,
                exits: 0,
                restores: 0,
                restored_last: false,
            }
        }

        fn stomped_at(senses: &[u32]) -> Self {
            let mut io = Self::clean();
            io.stomp_senses.extend_from_slice(senses);
            io
        }
    }

    impl GmlanIo for MockIo {
        fn set_line(&mut self, line: Line, high: bool) {
            assert_eq!(line, Line::Tx);
            assert!(self.critical_depth > 0, "drive outside critical section");
            self.driven_levels.push(high);
            self.restored_last = false;
        }

        fn set_mode(&mut self, line: Line, _mode: LineMode) {
            assert_eq!(line, Line::Tx);
            assert!(self.critical_depth > 0);
        }

        fn line_is_high(&mut self, line: Line) -> bool {
            assert_eq!(line, Line::Tx);
            let stomped = self.stomp_senses.contains(&self.senses);
            self.senses += 1;
            // The last driven level, unless a competing writer pulls low
            let driven = *self.driven_levels.last().unwrap();
            driven && !stomped
        }

        fn restore_transceiver(&mut self) {
            self.restores += 1;
            self.restored_last = true;
        }

        fn enter_critical_section(&mut self) {
            self.critical_depth += 1;
            self.enters += 1;
        }

        fn exit_critical_section(&mut self) {
            self.critical_depth -= 1;
            self.exits += 1;
        }
    }

    fn standard_frame() -> GatewayFrame {
        GatewayFrame::new(
            FrameId::standard(0x315).unwrap(),
            3,
            0xDEAD_BEEF,
            0x0123_4567,
        )
    }

    fn extended_frame() -> GatewayFrame {
        GatewayFrame::new(
            FrameId::extended(0x1040_0060).unwrap(),
            3,
            0xFF3C_0187,
            0,
        )
    }

    #[test]
    fn test_clean_attempt_standard_bit_count() {
        let mut bridge = GmlanBridge::new(MockIo::clean());
        assert!(bridge.attempt(&standard_frame()).is_ok());
        let io = bridge.into_inner();
        // 11 identifier bits + 32 + 32 data bits
        assert_eq!(io.driven_levels.len(), 75);
        assert_eq!(io.enters, 1);
        assert_eq!(io.exits, 1);
        assert_eq!(io.restores, 1);
        assert!(io.restored_last);
        assert_eq!(io.critical_depth, 0);
    }

    #[test]
    fn test_clean_attempt_extended_skips_word_b() {
        let mut bridge = GmlanBridge::new(MockIo::clean());
        assert!(bridge.attempt(&extended_frame()).is_ok());
        let io = bridge.into_inner();
        // 29 identifier bits + one 32-bit word only
        assert_eq!(io.driven_levels.len(), 61);
    }

    #[test]
    fn test_identifier_goes_out_msb_first() {
        let mut bridge = GmlanBridge::new(MockIo::clean());
        // Standard 0x555 = 101_0101_0101
        let frame = GatewayFrame::new(FrameId::standard(0x555).unwrap(), 3, 0, 0);
        assert!(bridge.attempt(&frame).is_ok());
        let io = bridge.into_inner();
        let expected = [
            true, false, true, false, true, false, true, false, true, false, true,
        ];
        assert_eq!(io.driven_levels[..11], expected);
    }

    #[test]
    fn test_arbitration_loss_reports_segment_and_bit() {
        // 0x555 has its first recessive bit at identifier index 0
        let frame = GatewayFrame::new(FrameId::standard(0x555).unwrap(), 3, 0, 0);

        let mut bridge = GmlanBridge::new(MockIo::stomped_at(&[0]));
        assert_eq!(
            bridge.attempt(&frame),
            Err(ArbitrationLoss {
                segment: Segment::Identifier,
                bit: 0
            })
        );
        let io = bridge.into_inner();
        assert!(io.restored_last, "line handed back after loss");
        assert_eq!(io.critical_depth, 0, "critical section balanced");

        // Stomp inside word A: the 0x555 identifier has 6 recessive bits
        // (sense indices 0..=5), so word A's leading recessive bit is
        // sense index 6
        let frame = GatewayFrame::new(FrameId::standard(0x555).unwrap(), 3, 0x8000_0000, 0);
        let mut bridge = GmlanBridge::new(MockIo::stomped_at(&[6]));
        assert_eq!(
            bridge.attempt(&frame),
            Err(ArbitrationLoss {
                segment: Segment::WordA,
                bit: 0
            })
        );
    }

    #[test]
    fn test_retry_restarts_from_identifier() {
        let frame = GatewayFrame::new(FrameId::standard(0x555).unwrap(), 3, 0, 0);
        // First attempt dies at its 3rd sensed bit; the second attempt's
        // readbacks are clean
        let mut bridge = GmlanBridge::new(MockIo::stomped_at(&[2]));
        assert!(bridge.attempt(&frame).is_err());
        assert!(bridge.attempt(&frame).is_ok());
        let io = bridge.into_inner();
        // First attempt stopped after 5 wire bits; the second drove all 75
        // again from identifier bit 0
        assert_eq!(io.driven_levels.len(), 5 + 75);
        assert_eq!(io.enters, 2);
        assert_eq!(io.exits, 2);
        assert_eq!(io.restores, 2);
    }

    #[test]
    fn test_send_reports_attempts_used() {
        let frame = GatewayFrame::new(FrameId::standard(0x555).unwrap(), 3, 0, 0);
        // First attempt loses its first recessive bit, second runs clean
        let mut bridge = GmlanBridge::new(MockIo::stomped_at(&[0]));
        assert_eq!(bridge.send(&frame), SendOutcome::Sent { attempts: 2 });
    }

    #[test]
    fn test_send_exhaustion_drops() {
        struct AlwaysStomped {
            enters: u32,
            exits: u32,
        }
        impl GmlanIo for AlwaysStomped {
            fn set_line(&mut self, _: Line, _: bool) {}
            fn set_mode(&mut self, _: Line, _: LineMode) {}
            fn line_is_high(&mut self, _: Line) -> bool {
                false
            }
            fn restore_transceiver(&mut self) {}
            fn enter_critical_section(&mut self) {
                self.enters += 1;
            }
            fn exit_critical_section(&mut self) {
                self.exits += 1;
            }
        }

        let frame = GatewayFrame::new(FrameId::standard(0x555).unwrap(), 3, 0, 0);
        let mut bridge = GmlanBridge::new(AlwaysStomped { enters: 0, exits: 0 });
        assert_eq!(
            bridge.send(&frame),
            SendOutcome::Dropped {
                attempts: MAX_SEND_ATTEMPTS
            }
        );
        let io = bridge.into_inner();
        assert_eq!(io.enters, MAX_SEND_ATTEMPTS);
        assert_eq!(io.exits, MAX_SEND_ATTEMPTS);
    }

    #[test]
    fn test_all_dominant_frame_never_loses() {
        // An all-zero frame only drives dominant bits, so a stomper can
        // never beat it
        let frame = GatewayFrame::new(FrameId::standard(0).unwrap(), 3, 0, 0);
        let mut bridge = GmlanBridge::new(MockIo::stomped_at(&[0, 1, 2, 3, 4, 5]));
        assert!(bridge.attempt(&frame).is_ok());
    }
}
