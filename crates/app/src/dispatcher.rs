//! Named signal dispatcher.
//!
//! Integrations use signals to tell their own platforms that something
//! changed (e.g. "hub `<entry>` updated") without the sender knowing who
//! listens. Each signal name maps to its own broadcast channel, created on
//! first use.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

/// Fan-out of payload-less signals keyed by name.
pub struct Dispatcher {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<()>>>,
}

impl Dispatcher {
    /// Create a dispatcher whose per-signal channels hold `capacity` pending signals.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to `signal`; only signals sent after this call are received.
    #[must_use]
    pub fn connect(&self, signal: &str) -> broadcast::Receiver<()> {
        let mut channels = self.lock();
        channels
            .entry(signal.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send `signal` to every current subscriber, returning how many were reached.
    pub fn send(&self, signal: &str) -> usize {
        let channels = self.lock();
        let reached = channels
            .get(signal)
            .and_then(|sender| sender.send(()).ok())
            .unwrap_or(0);
        tracing::trace!(signal, reached, "signal sent");
        reached
    }

    /// Drop the channel for `signal`; existing receivers observe it as closed.
    pub fn disconnect_all(&self, signal: &str) {
        self.lock().remove(signal);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, broadcast::Sender<()>>> {
        self.channels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(16)
    }
}
