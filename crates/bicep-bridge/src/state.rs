//! Bridge lifecycle state

/// Lifecycle state of a [`Bridge`](crate::Bridge)
///
/// A bridge only exists once its handshake succeeded, so there is no
/// state for a bridge that is still starting up or failed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Accepting operations
    Ready,
    /// Disposed; every operation fails with [`BridgeError::Disposed`](crate::BridgeError::Disposed)
    Disposed,
}

impl BridgeState {
    /// Whether operations are accepted
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}
