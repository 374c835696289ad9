//! The boundary toward the frame-dispatch framework.
//!
//! The dispatch loop that owns the hardware driver invokes one profile
//! through [`SafetyHooks`]. Invocation is single-threaded and
//! callback-driven: no two inbound and no two outbound calls ever overlap,
//! and each call is atomic with respect to the shared state, so the trait
//! takes `&mut self` and needs no interior locking.

use crate::frame::GatewayFrame;
use crate::gmlan::SendOutcome;

/// Verdict of the outbound gate for one candidate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TxDecision {
    /// The frame must never reach the vehicle's actuators.
    Deny,
    /// The frame may be transmitted through the normal path.
    Allow,
    /// The frame was approved and handed to the secondary-bus bridge in
    /// place of normal transmission; carries the bridge outcome.
    Bridged(SendOutcome),
}

impl TxDecision {
    /// Collapse to the dispatcher's permit/deny view.
    ///
    /// A bridged frame counts as allowed even when the bridge dropped it
    /// after retry exhaustion; the drop stays visible in the variant.
    #[inline]
    pub const fn is_allowed(&self) -> bool {
        !matches!(self, TxDecision::Deny)
    }
}

/// Per-vehicle safety profile hooks.
///
/// One implementation per vehicle; exactly one is active at a time.
pub trait SafetyHooks {
    /// Reset the profile. Closes the permission latch and clears ignition.
    /// The parameter is a profile-specific knob from the dispatcher;
    /// profiles may ignore it.
    fn init(&mut self, param: i16);

    /// Inbound frame intake. The frame carries its origin bus. No return
    /// value; side effects are limited to the profile's own state.
    fn rx(&mut self, frame: &GatewayFrame);

    /// Outbound gate, consulted once per candidate frame before it may
    /// reach the vehicle or the secondary bridge.
    fn tx(&mut self, frame: &GatewayFrame) -> TxDecision;

    /// Low-speed serial (LIN) submission. Profiles for vehicles without a
    /// supported LIN transport reject everything.
    fn tx_lin(&mut self, channel: u8, data: &[u8]) -> bool;

    /// Current ignition state as derived from bus traffic.
    fn ignition(&self) -> bool;

    /// Bus-forwarding policy: the bus a received frame should be forwarded
    /// to, or `None` for no forwarding.
    fn forward(&self, bus: u8, frame: &GatewayFrame) -> Option<u8>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmlan::MAX_SEND_ATTEMPTS;

    #[test]
    fn test_decision_permit_view() {
        assert!(!TxDecision::Deny.is_allowed());
        assert!(TxDecision::Allow.is_allowed());
        assert!(TxDecision::Bridged(SendOutcome::Sent { attempts: 1 }).is_allowed());
        // Dropped is still "allowed" to the dispatcher, but distinguishable
        assert!(
            TxDecision::Bridged(SendOutcome::Dropped {
                attempts: MAX_SEND_ATTEMPTS
            })
            .is_allowed()
        );
    }
}
