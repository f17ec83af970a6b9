use parley_core::SignalEnvelope;

/// Outbound side of signaling: sessions and presence hand their envelopes
/// here. Delivery is best-effort.
pub trait SignalingOutput: Send + Sync {
    fn send(&self, envelope: &SignalEnvelope);
}
