//! Vehicle state and the actuation permission latch.
//!
//! [`VehicleState`] is the single mutable context shared between the inbound
//! tracker and the outbound gatekeeper. It is owned by the profile object
//! and passed by `&mut self` into the hooks; there are no globals, which
//! keeps the single-writer-per-field discipline checkable and the whole
//! thing testable by constructing a fresh state.
//!
//! The permission latch (`controls_allowed`) is true only while no pedal
//! override is active and no foreign controller has been detected. The
//! inbound transition methods below are the only writers.

use crate::signals;

/// Brake pedal readings below this are sensor noise and treated as zero.
///
/// The pedal's potentiometer returns a near-zero reading even when the
/// pedal is not pressed.
pub const BRAKE_NOISE_FLOOR: u8 = 10;

/// Cruise button code: "set".
pub const BUTTON_SET: u8 = 2;
/// Cruise button code: "resume".
pub const BUTTON_RESUME: u8 = 3;
/// Cruise button code: "cancel".
pub const BUTTON_CANCEL: u8 = 6;

/// Shared vehicle state, reset at init.
///
/// `brake_prev` and `gas_prev` hold the last sampled pedal magnitudes and
/// exist purely for rising-edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleState {
    ignition_on: bool,
    speed: u16,
    brake_prev: u8,
    gas_prev: u8,
    foreign_controller: bool,
    controls_allowed: bool,
}

impl VehicleState {
    /// A fresh state: latch closed, ignition off, no history.
    pub const fn new() -> Self {
        Self {
            ignition_on: false,
            speed: 0,
            brake_prev: 0,
            gas_prev: 0,
            foreign_controller: false,
            controls_allowed: false,
        }
    }

    /// Reset everything, including the sticky foreign-controller flag.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Gear selector sample. Park (0) means ignition off; any other gear
    /// means the vehicle is "on".
    pub fn set_gear(&mut self, gear: u8) {
        self.ignition_on = gear != 0;
    }

    /// Wheel speed sample. Only zero vs. nonzero matters to the gating
    /// logic, but the raw magnitude is kept.
    pub fn set_speed(&mut self, speed: u16) {
        self.speed = speed;
    }

    /// Steering-wheel cruise button event.
    ///
    /// Set/resume opens the latch, cancel closes it, every other code is a
    /// no-op.
    pub fn cruise_button(&mut self, code: u8) {
        match code {
            BUTTON_SET | BUTTON_RESUME => self.controls_allowed = true,
            BUTTON_CANCEL => self.controls_allowed = false,
            _ => {}
        }
    }

    /// Brake pedal sample.
    ///
    /// Readings below [`BRAKE_NOISE_FLOOR`] count as zero. The latch closes
    /// on a rising edge, or on any nonzero reading while the vehicle is
    /// moving.
    pub fn sample_brake(&mut self, magnitude: u8) {
        let magnitude = if magnitude < BRAKE_NOISE_FLOOR {
            0
        } else {
            magnitude
        };
        if magnitude != 0 && (self.brake_prev == 0 || self.speed != 0) {
            self.controls_allowed = false;
        }
        self.brake_prev = magnitude;
    }

    /// Accelerator pedal sample. The latch closes on a strict rising edge,
    /// independent of speed.
    pub fn sample_gas(&mut self, magnitude: u8) {
        if magnitude != 0 && self.gas_prev == 0 {
            self.controls_allowed = false;
        }
        self.gas_prev = magnitude;
    }

    /// Regen paddle sample. Level-triggered: any active sample closes the
    /// latch, no edge required.
    pub fn regen_paddle(&mut self, active: bool) {
        if active {
            self.controls_allowed = false;
        }
    }

    /// A foreign (stock) controller heartbeat was observed on the primary
    /// bus. Sticky until [`reset`](Self::reset); closes the latch.
    pub fn foreign_controller_seen(&mut self) {
        self.foreign_controller = true;
        self.controls_allowed = false;
    }

    /// Force the latch closed without touching anything else.
    pub fn close_latch(&mut self) {
        self.controls_allowed = false;
    }

    /// Current latch position.
    #[inline]
    pub const fn controls_allowed(&self) -> bool {
        self.controls_allowed
    }

    /// True while a pedal is overriding: any gas, or brake while moving.
    #[inline]
    pub const fn pedal_override(&self) -> bool {
        self.gas_prev != 0 || (self.brake_prev != 0 && self.speed != 0)
    }

    /// Effective permission for actuation commands: latch open and no
    /// pedal override.
    #[inline]
    pub const fn actuation_permitted(&self) -> bool {
        self.controls_allowed && !self.pedal_override()
    }

    /// Derived ignition state (gear selector out of park).
    #[inline]
    pub const fn ignition_on(&self) -> bool {
        self.ignition_on
    }

    /// Whether a foreign controller has ever been seen since init.
    #[inline]
    pub const fn foreign_controller_present(&self) -> bool {
        self.foreign_controller
    }

    /// Last sampled wheel speed.
    #[inline]
    pub const fn speed(&self) -> u16 {
        self.speed
    }
}

/// Noise-floored brake magnitude as the tracker will see it.
///
/// Convenience for tests and diagnostics; combines
/// [`signals::decode_brake_pedal`] with the floor applied by
/// [`VehicleState::sample_brake`].
#[inline]
pub fn floored_brake_magnitude(data_lo: u32) -> u8 {
    let raw = signals::decode_brake_pedal(data_lo);
    if raw < BRAKE_NOISE_FLOOR { 0 } else { raw }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_latch(state: &mut VehicleState) {
        state.cruise_button(BUTTON_SET);
        assert!(state.controls_allowed());
    }

    #[test]
    fn test_ignition_tracks_gear() {
        let mut state = VehicleState::new();
        for gear in 0..8u8 {
            state.set_gear(gear);
            assert_eq!(state.ignition_on(), gear != 0);
        }
    }

    #[test]
    fn test_button_codes() {
        let mut state = VehicleState::new();
        state.cruise_button(BUTTON_SET);
        assert!(state.controls_allowed());
        state.cruise_button(BUTTON_CANCEL);
        assert!(!state.controls_allowed());
        state.cruise_button(BUTTON_RESUME);
        assert!(state.controls_allowed());
        // Every other code leaves the latch alone
        for code in [0, 1, 4, 5, 7] {
            state.cruise_button(code);
            assert!(state.controls_allowed());
        }
    }

    #[test]
    fn test_brake_noise_floor() {
        let mut state = VehicleState::new();
        open_latch(&mut state);
        state.sample_brake(BRAKE_NOISE_FLOOR - 1);
        assert!(state.controls_allowed());
        assert!(!state.pedal_override());
    }

    #[test]
    fn test_brake_rising_edge_closes_latch() {
        let mut state = VehicleState::new();
        open_latch(&mut state);
        state.sample_brake(BRAKE_NOISE_FLOOR);
        assert!(!state.controls_allowed());
    }

    #[test]
    fn test_sustained_brake_while_moving_closes_latch() {
        let mut state = VehicleState::new();
        state.sample_brake(100);
        state.set_speed(842);
        open_latch(&mut state);
        // No rising edge (prev nonzero) but the vehicle is moving
        state.sample_brake(100);
        assert!(!state.controls_allowed());
    }

    #[test]
    fn test_sustained_brake_stationary_keeps_latch() {
        let mut state = VehicleState::new();
        state.sample_brake(100);
        open_latch(&mut state);
        state.sample_brake(100);
        assert!(state.controls_allowed());
    }

    #[test]
    fn test_gas_strict_rising_edge() {
        let mut state = VehicleState::new();
        open_latch(&mut state);
        state.sample_gas(50);
        assert!(!state.controls_allowed());
        // Reopen; a second nonzero sample right after a nonzero one is not
        // an edge and must not re-close
        open_latch(&mut state);
        state.sample_gas(60);
        assert!(state.controls_allowed());
        // Release then press again: new edge
        state.sample_gas(0);
        state.sample_gas(10);
        assert!(!state.controls_allowed());
    }

    #[test]
    fn test_regen_paddle_level_triggered() {
        let mut state = VehicleState::new();
        open_latch(&mut state);
        state.regen_paddle(false);
        assert!(state.controls_allowed());
        state.regen_paddle(true);
        assert!(!state.controls_allowed());
        // Still held: stays closed even after reopening attempts settle
        open_latch(&mut state);
        state.regen_paddle(true);
        assert!(!state.controls_allowed());
    }

    #[test]
    fn test_foreign_controller_sticky() {
        let mut state = VehicleState::new();
        open_latch(&mut state);
        state.foreign_controller_seen();
        assert!(state.foreign_controller_present());
        assert!(!state.controls_allowed());
        // Only reset clears it
        state.reset();
        assert!(!state.foreign_controller_present());
    }

    #[test]
    fn test_pedal_override() {
        let mut state = VehicleState::new();
        assert!(!state.pedal_override());
        state.sample_gas(1);
        assert!(state.pedal_override());
        state.sample_gas(0);
        state.sample_brake(50);
        assert!(!state.pedal_override());
        state.set_speed(1);
        assert_eq!(state.speed(), 1);
        assert!(state.pedal_override());
    }
}
