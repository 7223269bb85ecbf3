//! Change notifications for polling clients.
//!
//! Every ledger-affecting write bumps a monotonic version and publishes an
//! `Update`. Clients either poll `version()` or subscribe for pushes; neither
//! is used for correctness.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
  Transaction,
  OpeningBalance,
  Rake,
  Tip,
  BankAccount,
  Player,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Update {
  pub version: u64,
  pub change: Change,
}

#[derive(Debug)]
pub struct Notifier {
  version: AtomicU64,
  sender: broadcast::Sender<Update>,
}

impl Notifier {
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { version: AtomicU64::new(0), sender }
  }

  pub fn version(&self) -> u64 {
    self.version.load(Ordering::SeqCst)
  }

  pub fn bump(&self, change: Change) -> u64 {
    let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
    // no subscribers is fine
    let _ = self.sender.send(Update { version, change });
    version
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Update> {
    self.sender.subscribe()
  }
}

impl Default for Notifier {
  fn default() -> Self {
    Self::new(64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bump_is_monotonic() {
    let notifier = Notifier::default();
    assert_eq!(notifier.version(), 0);
    assert_eq!(notifier.bump(Change::Transaction), 1);
    assert_eq!(notifier.bump(Change::Rake), 2);
    assert_eq!(notifier.version(), 2);
  }

  #[tokio::test]
  async fn subscribers_receive_updates() {
    let notifier = Notifier::default();
    let mut rx = notifier.subscribe();

    notifier.bump(Change::OpeningBalance);

    let update = rx.recv().await.unwrap();
    assert_eq!(update, Update { version: 1, change: Change::OpeningBalance });
  }
}
