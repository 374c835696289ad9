//! Safety profile for the Chevrolet Volt.
//!
//! [`VoltProfile`] is the per-vehicle profile behind the gateway's
//! [`SafetyHooks`] seam. The board enforces:
//!
//! - in-state: cruise set/resume buttons
//! - out-state: cancel button, regen paddle, accelerator rising edge,
//!   brake rising edge, brake while moving
//!
//! plus fail-closed behavior for as long as a stock controller is still
//! heartbeating on the primary bus, and per-command numeric bounds on every
//! outbound actuation message. Frames destined for the secondary GMLAN bus
//! are re-encoded through the [`GmlanBridge`] instead of the normal
//! transmit path.
//!
//! Exactly one vehicle's signal layout is supported; there is no runtime
//! profile switching.

use crate::frame::{FrameId, GatewayFrame};
use crate::gmlan::{GmlanBridge, GmlanIo};
use crate::hooks::{SafetyHooks, TxDecision};
use crate::signals;
use crate::state::VehicleState;

/// The bus the stock powertrain controllers live on.
pub const PRIMARY_BUS: u8 = 0;

/// Default bus number routed to the GMLAN bit-bang bridge.
pub const DEFAULT_GMLAN_BUS: u8 = 3;

/// Gear selector; also the ignition source (park = off).
pub const MSG_GEAR_SELECTOR: u16 = 0x135;
/// Rear left wheel speed.
pub const MSG_WHEEL_SPEED: u16 = 842;
/// Stock ASCM heartbeat (inbound) / gas-regen command (outbound). Same
/// arbitration identifier; direction tells them apart.
pub const MSG_ASCM_GAS_REGEN: u16 = 715;
/// Cruise/ACC steering wheel buttons.
pub const MSG_CRUISE_BUTTONS: u16 = 481;
/// Brake pedal position.
pub const MSG_BRAKE_PEDAL: u16 = 241;
/// Accelerator pedal position.
pub const MSG_GAS_PEDAL: u16 = 417;
/// Regenerative-braking paddle.
pub const MSG_REGEN_PADDLE: u16 = 189;
/// Friction brake command.
pub const MSG_BRAKE_COMMAND: u16 = 789;
/// LKA steering torque command.
pub const MSG_LKA_STEER: u16 = 384;
/// Park-assist steering command. Unlimited torque, never allowed.
pub const MSG_PARK_ASSIST_STEER: u16 = 823;

/// Maximum permitted friction brake intensity.
pub const MAX_BRAKE_COMMAND: u16 = 255;
/// Maximum permitted LKA torque magnitude, each direction.
pub const MAX_STEER_TORQUE: u16 = 255;
/// Maximum permitted gas/regen command value.
pub const MAX_GAS_REGEN: u16 = 3072;
/// The one gas/regen value legal while not permitted: not engaged, max
/// regen. Any other disabled-looking payload is rejected so a "disabled"
/// message cannot smuggle actuation.
pub const GAS_REGEN_DISABLED_VALUE: u16 = 1404;

/// The Volt safety profile: vehicle state plus the GMLAN bridge.
pub struct VoltProfile<IO: GmlanIo> {
    state: VehicleState,
    bridge: GmlanBridge<IO>,
    gmlan_bus: u8,
}

impl<IO: GmlanIo> VoltProfile<IO> {
    /// Create a profile with the default GMLAN bus routing.
    pub fn new(io: IO) -> Self {
        Self::with_gmlan_bus(io, DEFAULT_GMLAN_BUS)
    }

    /// Create a profile routing the given bus number to the bridge.
    pub fn with_gmlan_bus(io: IO, gmlan_bus: u8) -> Self {
        Self {
            state: VehicleState::new(),
            bridge: GmlanBridge::new(io),
            gmlan_bus,
        }
    }

    /// The current vehicle state.
    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// The secondary-bus bridge.
    pub fn bridge_mut(&mut self) -> &mut GmlanBridge<IO> {
        &mut self.bridge
    }

    fn check_brake_command(&self, frame: &GatewayFrame, permitted: bool) -> bool {
        let intensity = signals::decode_brake_command(frame.data_lo());
        if permitted {
            intensity <= MAX_BRAKE_COMMAND
        } else {
            intensity == 0
        }
    }

    fn check_steer_command(&self, frame: &GatewayFrame, permitted: bool) -> bool {
        let torque = signals::decode_steer_torque(frame.data_lo());
        if permitted {
            if torque & signals::STEER_SIGN_BIT != 0 {
                torque >= signals::STEER_WRAP - MAX_STEER_TORQUE
            } else {
                torque <= MAX_STEER_TORQUE
            }
        } else {
            torque == 0
        }
    }

    fn check_gas_regen_command(&self, frame: &GatewayFrame, permitted: bool) -> bool {
        let (value, apply) = signals::decode_gas_regen(frame.data_lo());
        if permitted {
            value <= MAX_GAS_REGEN
        } else {
            !apply && value == GAS_REGEN_DISABLED_VALUE
        }
    }
}

impl<IO: GmlanIo> SafetyHooks for VoltProfile<IO> {
    fn init(&mut self, _param: i16) {
        self.state.reset();
    }

    fn rx(&mut self, frame: &GatewayFrame) {
        // Every recognized identifier is standard-format; extended ones are
        // a separate namespace and pass through untouched.
        let FrameId::Standard(id) = frame.id() else {
            return;
        };
        let bus = frame.bus();
        match id {
            MSG_GEAR_SELECTOR if bus == PRIMARY_BUS => {
                self.state.set_gear(signals::decode_gear(frame.data_lo()));
            }
            MSG_WHEEL_SPEED => {
                self.state
                    .set_speed(signals::decode_wheel_speed(frame.data_lo()));
            }
            MSG_ASCM_GAS_REGEN if bus == PRIMARY_BUS => {
                #[cfg(feature = "log")]
                if !self.state.foreign_controller_present() {
                    log::warn!("stock ASCM detected on primary bus, failing closed");
                }
                self.state.foreign_controller_seen();
            }
            MSG_CRUISE_BUTTONS => {
                self.state
                    .cruise_button(signals::decode_cruise_buttons(frame.data_hi()));
            }
            MSG_BRAKE_PEDAL => {
                self.state
                    .sample_brake(signals::decode_brake_pedal(frame.data_lo()));
            }
            MSG_GAS_PEDAL => {
                self.state
                    .sample_gas(signals::decode_gas_pedal(frame.data_hi()));
            }
            MSG_REGEN_PADDLE => {
                self.state
                    .regen_paddle(signals::decode_regen_paddle(frame.data_lo()));
            }
            _ => {}
        }
    }

    fn tx(&mut self, frame: &GatewayFrame) -> TxDecision {
        // There can be only one commanding authority. While the stock ASCM
        // is known to be online, nothing goes out.
        if self.state.foreign_controller_present() {
            self.state.close_latch();
            return TxDecision::Deny;
        }

        let permitted = self.state.actuation_permitted();

        if let FrameId::Standard(id) = frame.id() {
            let within_bounds = match id {
                MSG_BRAKE_COMMAND => self.check_brake_command(frame, permitted),
                MSG_LKA_STEER => self.check_steer_command(frame, permitted),
                MSG_PARK_ASSIST_STEER => false,
                MSG_ASCM_GAS_REGEN => self.check_gas_regen_command(frame, permitted),
                _ => true,
            };
            if !within_bounds {
                return TxDecision::Deny;
            }
        }

        if frame.bus() == self.gmlan_bus {
            return TxDecision::Bridged(self.bridge.send(frame));
        }
        TxDecision::Allow
    }

    fn tx_lin(&mut self, _channel: u8, _data: &[u8]) -> bool {
        // No LIN transport on this vehicle
        false
    }

    fn ignition(&self) -> bool {
        self.state.ignition_on()
    }

    fn forward(&self, _bus: u8, _frame: &GatewayFrame) -> Option<u8> {
        // Pass-through is deliberately disabled for this vehicle
        None
    }
}
