//! Config entry setup and unload.
//!
//! Both report success as a boolean; the caller turns `false` into the
//! entry's error state.

use std::sync::Arc;

use pulsehub_app::entry_store::EntryStore;
use pulsehub_app::ports::IntegrationContext;
use pulsehub_domain::config_entry::ConfigEntry;
use pulsehub_domain::id::EntryId;

use crate::client::HubClient;
use crate::hub::PulseHub;
use crate::platform::{PLATFORMS, Platforms};

/// Connect `hub`, register it under the entry and load every platform.
pub async fn setup_entry<C: HubClient>(
    entry: &ConfigEntry,
    hub: Arc<PulseHub<C>>,
    store: &EntryStore<PulseHub<C>>,
    platforms: &Platforms<C>,
    ctx: &impl IntegrationContext,
) -> bool {
    if !hub.setup().await {
        return false;
    }
    store.insert(entry.entry_id, Arc::clone(&hub));

    for platform in PLATFORMS {
        match platforms.setup(platform, hub.client(), ctx).await {
            Ok(added) => tracing::debug!(platform = platform.domain(), added, "platform set up"),
            Err(err) => tracing::warn!(
                platform = platform.domain(),
                error = %err,
                "failed to set up platform"
            ),
        }
    }
    tracing::info!(entry = %entry.entry_id, title = %entry.title, "entry set up");
    true
}

/// Unload every platform and reset the entry's hub.
///
/// The hub stays registered when the reset fails or a platform did not unload.
pub async fn unload_entry<C: HubClient>(
    entry_id: EntryId,
    store: &EntryStore<PulseHub<C>>,
    platforms: &Platforms<C>,
) -> bool {
    let Some(hub) = store.get(entry_id) else {
        tracing::debug!(entry = %entry_id, "entry not loaded");
        return true;
    };

    let mut unloaded = true;
    for platform in PLATFORMS {
        unloaded &= platforms.unload(platform);
    }

    if !hub.reset().await {
        return false;
    }
    if unloaded {
        store.remove(entry_id);
        tracing::info!(entry = %entry_id, "entry unloaded");
    }
    unloaded
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::platform::tests::RecordingContext;
    use crate::roller::Roller;
    use crate::simulated::SimulatedHub;
    use pulsehub_app::dispatcher::Dispatcher;

    struct Fixture {
        entry: ConfigEntry,
        client: Arc<SimulatedHub>,
        hub: Arc<PulseHub<SimulatedHub>>,
        store: EntryStore<PulseHub<SimulatedHub>>,
        platforms: Platforms<SimulatedHub>,
        ctx: RecordingContext,
    }

    fn fixture(client: SimulatedHub) -> Fixture {
        let entry = ConfigEntry::new("automate", "Pulse Hub");
        let client = Arc::new(client);
        let hub = Arc::new(PulseHub::new(
            entry.entry_id,
            Arc::clone(&client),
            Arc::new(Dispatcher::default()),
        ));
        Fixture {
            entry,
            client,
            hub,
            store: EntryStore::new(),
            platforms: Platforms::new(),
            ctx: RecordingContext::default(),
        }
    }

    fn lounge() -> SimulatedHub {
        SimulatedHub::new(vec![Roller::new("ABC", "Lounge")], Duration::ZERO)
    }

    #[tokio::test]
    async fn should_leave_store_empty_when_setup_fails() {
        let client = lounge();
        client.set_reachable(false);
        let f = fixture(client);

        let ok = setup_entry(&f.entry, Arc::clone(&f.hub), &f.store, &f.platforms, &f.ctx).await;

        assert!(!ok);
        assert!(f.store.is_empty());
        assert!(f.platforms.is_empty());
    }

    #[tokio::test]
    async fn should_register_hub_under_entry_id() {
        let f = fixture(lounge());

        let ok = setup_entry(&f.entry, Arc::clone(&f.hub), &f.store, &f.platforms, &f.ctx).await;

        assert!(ok);
        let stored = f.store.get(f.entry.entry_id).unwrap();
        assert!(Arc::ptr_eq(&stored, &f.hub));
        assert_eq!(f.platforms.len(), 2);
    }

    #[tokio::test]
    async fn should_remove_hub_on_unload() {
        let f = fixture(lounge());
        setup_entry(&f.entry, Arc::clone(&f.hub), &f.store, &f.platforms, &f.ctx).await;

        assert!(unload_entry(f.entry.entry_id, &f.store, &f.platforms).await);

        assert!(f.store.is_empty());
        assert!(f.platforms.is_empty());
        assert!(!f.client.is_connected());
    }

    #[tokio::test]
    async fn should_keep_hub_when_reset_fails() {
        let f = fixture(lounge());
        setup_entry(&f.entry, Arc::clone(&f.hub), &f.store, &f.platforms, &f.ctx).await;
        f.client.set_reachable(false);

        assert!(!unload_entry(f.entry.entry_id, &f.store, &f.platforms).await);

        assert!(f.store.contains(f.entry.entry_id));
    }
}
