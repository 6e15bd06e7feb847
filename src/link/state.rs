//! Connection state shared between the link event handler and callers.

use std::fmt;
use tokio::sync::watch;

/// Connection state of the radio link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// Watch-channel backed holder of the current [`ConnectionState`]
///
/// Writers are the supervisor and its event handler task. Any number of
/// readers can take a snapshot with [`StateCell::get`] or await transitions
/// through [`StateCell::subscribe`].
#[derive(Debug)]
pub struct StateCell {
    tx: watch::Sender<ConnectionState>,
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::Disconnected);
        Self { tx }
    }

    pub fn get(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.get().is_connected()
    }

    /// Set the state, returning the previous one
    pub fn set(&self, state: ConnectionState) -> ConnectionState {
        self.tx.send_replace(state)
    }

    /// Move from `from` to `to` only if the current state is `from`
    pub fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == from {
                *current = to;
                true
            } else {
                false
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_disconnected() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), ConnectionState::Disconnected);
        assert!(!cell.is_connected());
    }

    #[test]
    fn test_set_returns_previous_state() {
        let cell = StateCell::new();
        assert_eq!(cell.set(ConnectionState::Connecting), ConnectionState::Disconnected);
        assert_eq!(cell.set(ConnectionState::Connected), ConnectionState::Connecting);
        assert!(cell.is_connected());
    }

    #[test]
    fn test_transition_only_from_expected_state() {
        let cell = StateCell::new();
        cell.set(ConnectionState::Connected);

        // Not connecting, nothing happens
        assert!(!cell.transition(ConnectionState::Connecting, ConnectionState::Disconnected));
        assert_eq!(cell.get(), ConnectionState::Connected);

        assert!(cell.transition(ConnectionState::Connected, ConnectionState::Disconnected));
        assert_eq!(cell.get(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_subscriber_observes_transition() {
        let cell = StateCell::new();
        let mut rx = cell.subscribe();

        cell.set(ConnectionState::Connected);

        let state = rx.wait_for(|s| s.is_connected()).await.unwrap();
        assert_eq!(*state, ConnectionState::Connected);
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
    }
}
