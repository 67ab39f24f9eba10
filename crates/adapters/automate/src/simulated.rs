//! In-process hub that behaves like a Pulse Hub without any network.
//!
//! The daemon runs it in place of a real hub client; tests use it to
//! drive discovery and inspect the commands a cover sent.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::client::{HubClient, HubUpdate};
use crate::roller::{MovingAction, Roller};

const UPDATE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum SimulatedHubError {
    #[error("hub is unreachable")]
    Unreachable,

    #[error("hub is not connected")]
    NotConnected,

    #[error("unknown roller {0:?}")]
    UnknownRoller(String),
}

/// A command received by the simulated hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubCommand {
    Up(String),
    Down(String),
    Stop(String),
    MoveTo(String, u8),
}

struct Slot {
    roller: Roller,
    /// Bumped by every command so a superseded move does not finish.
    generation: u64,
}

struct Inner {
    rollers: Mutex<BTreeMap<String, Slot>>,
    updates: broadcast::Sender<HubUpdate>,
    connected: AtomicBool,
    reachable: AtomicBool,
    travel: Duration,
    history: Mutex<Vec<HubCommand>>,
}

/// Simulated hub; clones share the same rollers.
#[derive(Clone)]
pub struct SimulatedHub {
    inner: Arc<Inner>,
}

impl Default for SimulatedHub {
    fn default() -> Self {
        Self::new(Vec::new(), Duration::ZERO)
    }
}

impl SimulatedHub {
    /// A hub reporting `rollers`, whose moves take `travel` to complete.
    #[must_use]
    pub fn new(rollers: impl IntoIterator<Item = Roller>, travel: Duration) -> Self {
        let rollers = rollers
            .into_iter()
            .map(|roller| {
                (
                    roller.id.clone(),
                    Slot {
                        roller,
                        generation: 0,
                    },
                )
            })
            .collect();
        Self {
            inner: Arc::new(Inner {
                rollers: Mutex::new(rollers),
                updates: broadcast::channel(UPDATE_CAPACITY).0,
                connected: AtomicBool::new(false),
                reachable: AtomicBool::new(true),
                travel,
                history: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Make the hub discover a new roller.
    pub fn add_roller(&self, roller: Roller) {
        let id = roller.id.clone();
        self.lock_rollers().insert(
            id.clone(),
            Slot {
                roller,
                generation: 0,
            },
        );
        self.notify(HubUpdate::RollerAdded(id));
    }

    /// Replace what the hub reports for a roller, adding it when unknown.
    pub fn set_roller(&self, roller: Roller) {
        let id = roller.id.clone();
        let added = {
            let mut rollers = self.lock_rollers();
            match rollers.get_mut(&id) {
                Some(slot) => {
                    slot.roller = roller;
                    slot.generation += 1;
                    false
                }
                None => {
                    rollers.insert(
                        id.clone(),
                        Slot {
                            roller,
                            generation: 0,
                        },
                    );
                    true
                }
            }
        };
        self.notify(if added {
            HubUpdate::RollerAdded(id)
        } else {
            HubUpdate::RollerChanged(id)
        });
    }

    /// Make connect and disconnect fail while `false`.
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Whether `connect` succeeded and no `disconnect` followed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Every command received so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<HubCommand> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn lock_rollers(&self) -> MutexGuard<'_, BTreeMap<String, Slot>> {
        self.inner
            .rollers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn notify(&self, update: HubUpdate) {
        // no receiver is not an error
        let _ = self.inner.updates.send(update);
    }

    fn ensure_reachable(&self) -> Result<(), SimulatedHubError> {
        if self.inner.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SimulatedHubError::Unreachable)
        }
    }

    fn record(&self, command: HubCommand) -> Result<(), SimulatedHubError> {
        if !self.is_connected() {
            return Err(SimulatedHubError::NotConnected);
        }
        self.inner
            .history
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(command);
        Ok(())
    }

    /// Start moving `roller_id` towards `target` percent closed, or stop it
    /// where it is when `target` is `None`.
    fn start_move(&self, roller_id: &str, target: Option<u8>) -> Result<(), SimulatedHubError> {
        let generation = {
            let mut rollers = self.lock_rollers();
            let slot = rollers
                .get_mut(roller_id)
                .ok_or_else(|| SimulatedHubError::UnknownRoller(roller_id.to_string()))?;
            slot.generation += 1;
            let roller = &mut slot.roller;
            match target {
                None => roller.action = MovingAction::Stopped,
                Some(target) if self.inner.travel.is_zero() => {
                    roller.closed_percent = Some(target);
                    roller.action = MovingAction::Stopped;
                }
                Some(target) => {
                    let from = roller.closed_percent.unwrap_or(0);
                    roller.action = match target.cmp(&from) {
                        std::cmp::Ordering::Less => MovingAction::Up,
                        std::cmp::Ordering::Greater => MovingAction::Down,
                        std::cmp::Ordering::Equal => MovingAction::Stopped,
                    };
                }
            }
            slot.generation
        };
        self.notify(HubUpdate::RollerChanged(roller_id.to_string()));

        if let Some(target) = target.filter(|_| !self.inner.travel.is_zero()) {
            let hub = self.clone();
            let roller_id = roller_id.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(hub.inner.travel).await;
                hub.finish_move(&roller_id, generation, target);
            });
        }
        Ok(())
    }

    fn finish_move(&self, roller_id: &str, generation: u64, target: u8) {
        {
            let mut rollers = self.lock_rollers();
            let Some(slot) = rollers.get_mut(roller_id) else {
                return;
            };
            if slot.generation != generation {
                return;
            }
            slot.roller.closed_percent = Some(target);
            slot.roller.action = MovingAction::Stopped;
        }
        tracing::trace!(roller = roller_id, target, "simulated move finished");
        self.notify(HubUpdate::RollerChanged(roller_id.to_string()));
    }
}

impl HubClient for SimulatedHub {
    type Error = SimulatedHubError;

    async fn connect(&self) -> Result<(), Self::Error> {
        self.ensure_reachable()?;
        self.inner.connected.store(true, Ordering::SeqCst);
        tracing::debug!(rollers = self.lock_rollers().len(), "simulated hub connected");
        self.notify(HubUpdate::Connected);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), Self::Error> {
        self.ensure_reachable()?;
        self.inner.connected.store(false, Ordering::SeqCst);
        self.notify(HubUpdate::Disconnected);
        Ok(())
    }

    fn rollers(&self) -> Vec<Roller> {
        self.lock_rollers()
            .values()
            .map(|slot| slot.roller.clone())
            .collect()
    }

    fn roller(&self, roller_id: &str) -> Option<Roller> {
        self.lock_rollers()
            .get(roller_id)
            .map(|slot| slot.roller.clone())
    }

    fn updates(&self) -> broadcast::Receiver<HubUpdate> {
        self.inner.updates.subscribe()
    }

    async fn move_up(&self, roller_id: &str) -> Result<(), Self::Error> {
        self.record(HubCommand::Up(roller_id.to_string()))?;
        self.start_move(roller_id, Some(0))
    }

    async fn move_down(&self, roller_id: &str) -> Result<(), Self::Error> {
        self.record(HubCommand::Down(roller_id.to_string()))?;
        self.start_move(roller_id, Some(100))
    }

    async fn move_stop(&self, roller_id: &str) -> Result<(), Self::Error> {
        self.record(HubCommand::Stop(roller_id.to_string()))?;
        self.start_move(roller_id, None)
    }

    async fn move_to(&self, roller_id: &str, closed_percent: u8) -> Result<(), Self::Error> {
        self.record(HubCommand::MoveTo(roller_id.to_string(), closed_percent))?;
        self.start_move(roller_id, Some(closed_percent.min(100)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lounge() -> Roller {
        Roller::new("ABC", "Lounge").with_closed_percent(0)
    }

    #[tokio::test]
    async fn should_refuse_commands_before_connect() {
        let hub = SimulatedHub::new(vec![lounge()], Duration::ZERO);
        let result = hub.move_down("ABC").await;
        assert!(matches!(result, Err(SimulatedHubError::NotConnected)));
        assert!(hub.history().is_empty());
    }

    #[tokio::test]
    async fn should_fail_connect_when_unreachable() {
        let hub = SimulatedHub::default();
        hub.set_reachable(false);
        assert!(matches!(
            hub.connect().await,
            Err(SimulatedHubError::Unreachable)
        ));
        assert!(!hub.is_connected());
    }

    #[tokio::test]
    async fn should_complete_move_immediately_without_travel() {
        let hub = SimulatedHub::new(vec![lounge()], Duration::ZERO);
        hub.connect().await.unwrap();

        hub.move_to("ABC", 70).await.unwrap();

        let roller = hub.roller("ABC").unwrap();
        assert_eq!(roller.closed_percent, Some(70));
        assert_eq!(roller.action, MovingAction::Stopped);
    }

    #[tokio::test]
    async fn should_report_motion_until_travel_elapsed() {
        let hub = SimulatedHub::new(vec![lounge()], Duration::from_millis(20));
        hub.connect().await.unwrap();

        hub.move_down("ABC").await.unwrap();
        assert_eq!(hub.roller("ABC").unwrap().action, MovingAction::Down);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let roller = hub.roller("ABC").unwrap();
        assert_eq!(roller.closed_percent, Some(100));
        assert_eq!(roller.action, MovingAction::Stopped);
    }

    #[tokio::test]
    async fn should_not_finish_move_after_stop() {
        let hub = SimulatedHub::new(vec![lounge()], Duration::from_millis(20));
        hub.connect().await.unwrap();

        hub.move_down("ABC").await.unwrap();
        hub.move_stop("ABC").await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let roller = hub.roller("ABC").unwrap();
        assert_eq!(roller.closed_percent, Some(0));
        assert_eq!(roller.action, MovingAction::Stopped);
    }

    #[tokio::test]
    async fn should_reject_unknown_roller() {
        let hub = SimulatedHub::default();
        hub.connect().await.unwrap();
        let result = hub.move_up("nope").await;
        assert!(matches!(result, Err(SimulatedHubError::UnknownRoller(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn should_announce_added_roller() {
        let hub = SimulatedHub::default();
        let mut updates = hub.updates();

        hub.add_roller(lounge());

        assert_eq!(
            updates.recv().await.unwrap(),
            HubUpdate::RollerAdded("ABC".to_string())
        );
        assert_eq!(hub.rollers().len(), 1);
    }
}
