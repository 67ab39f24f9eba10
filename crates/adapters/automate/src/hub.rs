//! Hub connection for one config entry.
//!
//! [`PulseHub`] owns the client connection and the background tasks tied
//! to it. Every notification the client pushes is re-sent as the entry's
//! update signal so platforms can refresh without knowing the client.

use std::sync::{Arc, Mutex};

use pulsehub_app::dispatcher::Dispatcher;
use pulsehub_domain::id::EntryId;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::client::HubClient;

/// Name of the signal sent whenever the hub of `entry_id` reports an update.
#[must_use]
pub fn update_signal(entry_id: EntryId) -> String {
    format!("automate_hub_update_{entry_id}")
}

pub struct PulseHub<C> {
    entry_id: EntryId,
    client: Arc<C>,
    dispatcher: Arc<Dispatcher>,
    cleanup: Mutex<Vec<JoinHandle<()>>>,
}

impl<C: HubClient> PulseHub<C> {
    /// Connection for the config entry `entry_id`, announcing updates on `dispatcher`.
    #[must_use]
    pub fn new(entry_id: EntryId, client: Arc<C>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            entry_id,
            client,
            dispatcher,
            cleanup: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    /// The hub client shared with every entity of the entry.
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Dispatcher signal fired on every hub update for this entry.
    #[must_use]
    pub fn signal(&self) -> String {
        update_signal(self.entry_id)
    }

    /// Connect the client and start forwarding its updates.
    ///
    /// Returns `false` when the client cannot connect.
    pub async fn setup(&self) -> bool {
        // subscribe first so nothing sent while connecting is missed
        let mut updates = self.client.updates();
        if let Err(err) = self.client.connect().await {
            tracing::warn!(entry = %self.entry_id, error = %err, "failed to connect to hub");
            return false;
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let signal = self.signal();
        let handle = tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => {
                        tracing::debug!(?update, "hub update received");
                        dispatcher.send(&signal);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "hub updates lagged");
                        dispatcher.send(&signal);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        self.push_cleanup(handle);

        tracing::info!(entry = %self.entry_id, "hub connected");
        true
    }

    /// Abort every registered task and disconnect the client.
    ///
    /// Returns `false` when the client fails to disconnect.
    pub async fn reset(&self) -> bool {
        let handles = std::mem::take(&mut *self.lock_cleanup());
        let aborted = handles.len();
        for handle in handles {
            handle.abort();
        }
        self.dispatcher.disconnect_all(&self.signal());
        tracing::debug!(entry = %self.entry_id, aborted, "hub tasks aborted");

        match self.client.disconnect().await {
            Ok(()) => {
                tracing::info!(entry = %self.entry_id, "hub disconnected");
                true
            }
            Err(err) => {
                tracing::warn!(entry = %self.entry_id, error = %err, "failed to disconnect from hub");
                false
            }
        }
    }

    /// Register a task to abort on [`reset`](Self::reset).
    pub fn push_cleanup(&self, handle: JoinHandle<()>) {
        self.lock_cleanup().push(handle);
    }

    fn lock_cleanup(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.cleanup
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::roller::Roller;
    use crate::simulated::SimulatedHub;

    fn hub(client: SimulatedHub) -> PulseHub<SimulatedHub> {
        PulseHub::new(
            EntryId::new(),
            Arc::new(client),
            Arc::new(Dispatcher::default()),
        )
    }

    #[test]
    fn should_name_signal_after_entry() {
        let entry_id = EntryId::new();
        assert_eq!(
            update_signal(entry_id),
            format!("automate_hub_update_{entry_id}")
        );
    }

    #[tokio::test]
    async fn should_fail_setup_when_hub_unreachable() {
        let client = SimulatedHub::default();
        client.set_reachable(false);
        let hub = hub(client);

        assert!(!hub.setup().await);
        assert!(hub.lock_cleanup().is_empty());
    }

    #[tokio::test]
    async fn should_forward_client_updates_as_signal() {
        let client = SimulatedHub::default();
        let hub = hub(client.clone());
        assert!(hub.setup().await);
        let mut signals = hub.dispatcher.connect(&hub.signal());

        client.add_roller(Roller::new("ABC", "Lounge"));

        let received = tokio::time::timeout(Duration::from_secs(1), signals.recv()).await;
        assert!(matches!(received, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn should_abort_tasks_and_disconnect_on_reset() {
        let client = SimulatedHub::default();
        let hub = hub(client.clone());
        assert!(hub.setup().await);
        hub.push_cleanup(tokio::spawn(std::future::pending()));

        assert!(hub.reset().await);
        assert!(hub.lock_cleanup().is_empty());
        assert!(!client.is_connected());
    }
}
