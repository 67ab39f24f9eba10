//! Hub client port — the boundary to the library that talks to the hub.
//!
//! The wire protocol, LAN discovery and connection handling live behind
//! this trait. The integration only reads roller snapshots and forwards
//! commands; it never retries or times out a call itself.

use std::future::Future;

use tokio::sync::broadcast;

use crate::roller::Roller;

/// Notification pushed by the client when the hub reports something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubUpdate {
    Connected,
    RollerAdded(String),
    RollerChanged(String),
    Disconnected,
}

/// A connected hub, as exposed by the hub client library.
pub trait HubClient: Send + Sync + 'static {
    /// The client's own error type; carried unchanged inside
    /// [`AutomateError::Client`](crate::AutomateError::Client).
    type Error: std::error::Error + Send + Sync + 'static;

    fn connect(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn disconnect(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Snapshot of every roller the hub currently knows.
    fn rollers(&self) -> Vec<Roller>;

    /// Snapshot of a single roller.
    fn roller(&self, roller_id: &str) -> Option<Roller>;

    /// Subscribe to hub notifications sent after this call.
    fn updates(&self) -> broadcast::Receiver<HubUpdate>;

    fn move_up(&self, roller_id: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn move_down(&self, roller_id: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn move_stop(&self, roller_id: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Move to a hub-convention position (`0` open, `100` closed).
    fn move_to(
        &self,
        roller_id: &str,
        closed_percent: u8,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
