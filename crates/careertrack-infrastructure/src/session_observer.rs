//! Channel-based session observer.
//!
//! Fans sign-in / sign-out transitions out to every subscriber. An
//! authentication client calls `sign_in` / `sign_out` when its state
//! changes; tests call them to script transitions.

use careertrack_core::session::{IdentityKey, SessionChange, SessionObserver, SessionStream};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Default)]
struct ObserverState {
    current: Option<IdentityKey>,
    subscribers: Vec<mpsc::UnboundedSender<SessionChange>>,
}

#[derive(Clone, Default)]
pub struct ChannelSessionObserver {
    state: Arc<Mutex<ObserverState>>,
}

impl ChannelSessionObserver {
    /// Starts signed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts signed in as `identity`.
    pub fn signed_in(identity: IdentityKey) -> Self {
        let observer = Self::default();
        observer.lock().current = Some(identity);
        observer
    }

    pub fn sign_in(&self, identity: IdentityKey) {
        tracing::info!("[SessionObserver] Signed in as {}", identity);
        self.transition(Some(identity));
    }

    pub fn sign_out(&self) {
        tracing::info!("[SessionObserver] Signed out");
        self.transition(None);
    }

    pub fn current(&self) -> Option<IdentityKey> {
        self.lock().current.clone()
    }

    /// Live subscribers; dropped streams are pruned on the next transition.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|s| !s.is_closed());
        state.subscribers.len()
    }

    fn transition(&self, identity: Option<IdentityKey>) {
        let mut state = self.lock();
        state.current = identity.clone();
        let change = SessionChange::from(identity);
        state
            .subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }

    fn lock(&self) -> MutexGuard<'_, ObserverState> {
        // Nothing inside can be left half-updated by a panic.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionObserver for ChannelSessionObserver {
    fn subscribe(&self) -> SessionStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.lock();
        // Current state first, as the port requires.
        let _ = sender.send(SessionChange::from(state.current.clone()));
        state.subscribers.push(sender);
        receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_delivers_current_state_first() {
        let observer = ChannelSessionObserver::signed_in(IdentityKey::from("u1"));
        let mut stream = observer.subscribe();
        assert_eq!(
            stream.recv().await,
            Some(SessionChange::SignedIn(IdentityKey::from("u1")))
        );
    }

    #[tokio::test]
    async fn test_transitions_are_delivered_in_order() {
        let observer = ChannelSessionObserver::new();
        let mut stream = observer.subscribe();
        observer.sign_in(IdentityKey::from("u1"));
        observer.sign_out();

        assert_eq!(stream.recv().await, Some(SessionChange::SignedOut));
        assert_eq!(
            stream.recv().await,
            Some(SessionChange::SignedIn(IdentityKey::from("u1")))
        );
        assert_eq!(stream.recv().await, Some(SessionChange::SignedOut));
        assert_eq!(observer.current(), None);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let observer = ChannelSessionObserver::new();
        let stream = observer.subscribe();
        assert_eq!(observer.subscriber_count(), 1);
        drop(stream);
        assert_eq!(observer.subscriber_count(), 0);
    }
}
