//! Per-signal bit codecs for the Volt signal layout.
//!
//! Each signal the profile reads or bounds-checks gets a pure decode
//! function with its bit positions documented, plus an encode counterpart so
//! the layout is round-trip testable and auditable in one place. Only the
//! handful of signals needed for safety gating are decoded; full bus
//! decoding is out of scope.
//!
//! All functions operate on the frame's payload words (`data_lo` = payload
//! bytes 0..=3 little-endian, `data_hi` = bytes 4..=7; see
//! [`crate::frame`]). Signals that live entirely in the low word take only
//! `data_lo`, and vice versa.

/// Sign bit of the 11-bit LKA steering torque field.
pub const STEER_SIGN_BIT: u16 = 0x400;

/// Wrap point of the 11-bit steering torque field (two's-complement style).
pub const STEER_WRAP: u16 = 0x800;

/// Gear position, low 3 bits of byte 0. Zero means park.
#[inline]
pub const fn decode_gear(data_lo: u32) -> u8 {
    (data_lo & 0x7) as u8
}

/// Encode a gear position into payload word form.
#[inline]
pub const fn encode_gear(gear: u8) -> u32 {
    (gear & 0x7) as u32
}

/// Rear wheel speed, 16-bit field in bytes 0..=1.
#[inline]
pub const fn decode_wheel_speed(data_lo: u32) -> u16 {
    (data_lo & 0xFFFF) as u16
}

/// Encode a wheel speed into payload word form.
#[inline]
pub const fn encode_wheel_speed(speed: u16) -> u32 {
    speed as u32
}

/// Cruise/ACC steering wheel button code, 3 bits at offset 12 of the high
/// word (payload byte 5, bits 4..=6).
#[inline]
pub const fn decode_cruise_buttons(data_hi: u32) -> u8 {
    ((data_hi >> 12) & 0x7) as u8
}

/// Encode a cruise button code into high-word form.
#[inline]
pub const fn encode_cruise_buttons(code: u8) -> u32 {
    ((code & 0x7) as u32) << 12
}

/// Brake pedal magnitude, byte 1 of the payload.
///
/// Raw sensor value; the pedal's potentiometer reads near-zero even when
/// released, so the tracker applies a noise floor on top of this.
#[inline]
pub const fn decode_brake_pedal(data_lo: u32) -> u8 {
    ((data_lo >> 8) & 0xFF) as u8
}

/// Encode a brake pedal magnitude into payload word form.
#[inline]
pub const fn encode_brake_pedal(magnitude: u8) -> u32 {
    (magnitude as u32) << 8
}

/// Accelerator pedal magnitude, byte 6 of the payload (high word byte 2).
#[inline]
pub const fn decode_gas_pedal(data_hi: u32) -> u8 {
    ((data_hi >> 16) & 0xFF) as u8
}

/// Encode an accelerator pedal magnitude into high-word form.
#[inline]
pub const fn encode_gas_pedal(magnitude: u8) -> u32 {
    (magnitude as u32) << 16
}

/// Regenerative-braking paddle, bit 5 of byte 0.
#[inline]
pub const fn decode_regen_paddle(data_lo: u32) -> bool {
    data_lo & 0x20 != 0
}

/// Encode the regen paddle bit into payload word form.
#[inline]
pub const fn encode_regen_paddle(active: bool) -> u32 {
    (active as u32) << 5
}

/// Friction brake command intensity, 12 bits across bytes 0..=1.
///
/// Wire layout: low nibble of byte 0 carries the high 4 bits, byte 1 the
/// low 8 bits. The wire value is inverted; the decoded intensity is
/// `(0x1000 - raw) & 0xFFF`, so an all-zero payload decodes to 0.
#[inline]
pub const fn decode_brake_command(data_lo: u32) -> u16 {
    let raw = ((data_lo & 0xF) << 8) | ((data_lo >> 8) & 0xFF);
    ((0x1000 - raw) & 0xFFF) as u16
}

/// Encode a brake command intensity into payload word form.
#[inline]
pub const fn encode_brake_command(intensity: u16) -> u32 {
    let raw = (0x1000 - (intensity as u32 & 0xFFF)) & 0xFFF;
    ((raw >> 8) & 0xF) | ((raw & 0xFF) << 8)
}

/// LKA steering torque, 11 bits across bytes 0..=1, two's-complement style.
///
/// Wire layout: low 3 bits of byte 0 carry the high bits, byte 1 the low 8
/// bits. Bit [`STEER_SIGN_BIT`] is the sign; negative torques sit in the
/// range `STEER_WRAP - magnitude`.
#[inline]
pub const fn decode_steer_torque(data_lo: u32) -> u16 {
    (((data_lo & 0x7) << 8) | ((data_lo >> 8) & 0xFF)) as u16
}

/// Encode an 11-bit steering torque field into payload word form.
#[inline]
pub const fn encode_steer_torque(raw: u16) -> u32 {
    let raw = (raw & 0x7FF) as u32;
    ((raw >> 8) & 0x7) | ((raw & 0xFF) << 8)
}

/// Gas/regen command: 12-bit value split across two non-adjacent fields,
/// plus a 1-bit "apply" flag.
///
/// Wire layout: bits 5..=11 of the value live in byte 2 (word bits
/// 16..=22), bits 0..=4 in the top of byte 3 (word bits 27..=31), and the
/// apply flag is bit 0 of byte 0.
#[inline]
pub const fn decode_gas_regen(data_lo: u32) -> (u16, bool) {
    let value = ((data_lo & 0x7F_0000) >> 11) + ((data_lo & 0xF800_0000) >> 27);
    (value as u16, data_lo & 1 != 0)
}

/// Encode a gas/regen command value and apply flag into payload word form.
#[inline]
pub const fn encode_gas_regen(value: u16, apply: bool) -> u32 {
    let value = (value & 0xFFF) as u32;
    (((value >> 5) & 0x7F) << 16) | ((value & 0x1F) << 27) | (apply as u32)
}
