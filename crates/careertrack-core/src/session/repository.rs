//! Session observer port.
//!
//! Defines the interface to the authentication provider's session signal.

use super::event::SessionChange;
use tokio::sync::mpsc;

/// Stream of session transitions. Dropping it unsubscribes.
pub type SessionStream = mpsc::UnboundedReceiver<SessionChange>;

/// Reports whether a user session is active.
///
/// This trait decouples the sync manager from any concrete authentication
/// provider, so tests can drive it with scripted transitions.
///
/// # Implementation Notes
///
/// Implementations must:
/// - send the current state immediately upon subscribing
/// - send one change per sign-in / sign-out transition, in order
pub trait SessionObserver: Send + Sync {
    /// Subscribes to session transitions.
    fn subscribe(&self) -> SessionStream;
}
