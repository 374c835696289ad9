#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

//! # voltgate-rs
//!
//! A Rust library implementing the per-vehicle safety profile of a
//! CAN-intercepting gateway for the Chevrolet Volt.
//!
//! The profile decides, frame by frame, whether a command destined for the
//! vehicle's steering, braking, or propulsion actuators may be transmitted,
//! and bridges approved commands onto the secondary single-wire GMLAN bus
//! that the gateway's primary hardware transceiver cannot address.
//!
//! ## Features
//!
//! - **Inbound tracking**: ignition, wheel speed, pedal edges, and stock
//!   controller presence sampled from bus traffic
//! - **Latched permission**: cruise buttons open the latch; pedals, the
//!   regen paddle, and a detected stock controller close it
//! - **Outbound gating**: per-message numeric bounds on brake, steering,
//!   and gas/regen commands with the Volt's bit layouts
//! - **GMLAN bridging**: software bit-banging with arbitration-loss
//!   detection and bounded retry
//!
//! ## Quick Start
//!
//! ```no_run
//! use voltgate_rs::{
//!     FrameId, GatewayFrame, GmlanIo, Line, LineMode, SafetyHooks, VoltProfile,
//! };
//!
//! # struct BoardIo;
//! # impl GmlanIo for BoardIo {
//! #     fn set_line(&mut self, _: Line, _: bool) {}
//! #     fn set_mode(&mut self, _: Line, _: LineMode) {}
//! #     fn line_is_high(&mut self, _: Line) -> bool { true }
//! #     fn restore_transceiver(&mut self) {}
//! #     fn enter_critical_section(&mut self) {}
//! #     fn exit_critical_section(&mut self) {}
//! # }
//! let mut profile = VoltProfile::new(BoardIo);
//! profile.init(0);
//!
//! // Feed inbound traffic to the tracker
//! let gear = GatewayFrame::new(FrameId::Standard(0x135), 0, 0x4, 0);
//! profile.rx(&gear);
//! assert!(profile.ignition());
//!
//! // Gate an outbound candidate
//! let candidate = GatewayFrame::new(FrameId::Standard(0x180), 0, 0, 0);
//! let decision = profile.tx(&candidate);
//! if decision.is_allowed() {
//!     // hand the frame to the transceiver driver
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`frame`] | Frame model and tagged arbitration identifiers |
//! | [`signals`] | Per-signal bit codecs for the Volt's layouts |
//! | [`state`] | Vehicle state and the permission latch |
//! | [`hooks`] | The [`SafetyHooks`] seam toward the dispatch framework |
//! | [`volt`] | The Volt profile: tracker, gatekeeper, lifecycle |
//! | [`gmlan`] | Single-wire GMLAN bit-bang bridge |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Cargo features
//!
//! - `std` (default): `std::error::Error` impl; the core logic is
//!   `no_std`-clean without it
//! - `can` (default): build frames from any [`embedded-can`](https://crates.io/crates/embedded-can) frame
//! - `serde`: serialization derives on the public value types
//! - `log`: warnings at safety-relevant events via the `log` facade

pub mod error;
pub mod frame;
pub mod gmlan;
pub mod hooks;
pub mod signals;
pub mod state;
pub mod volt;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
pub use frame::{FrameId, GatewayFrame};
pub use gmlan::{
    ArbitrationLoss, GmlanBridge, GmlanIo, Line, LineMode, MAX_SEND_ATTEMPTS, Segment, SendOutcome,
};
pub use hooks::{SafetyHooks, TxDecision};
pub use state::VehicleState;
pub use volt::VoltProfile;
