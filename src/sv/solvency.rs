//! Solvency guard for outgoing transactions.
//!
//! The check and the insert it protects must run as one unit per channel:
//! [`ChannelLocks`] serializes writers of a channel in this process. The
//! caller inserts the outgoing row first, which takes SQLite's write lock,
//! then calls [`authorize`] in the same database transaction and rolls back
//! if it fails.

use tokio::{
  sync::{Mutex, OwnedMutexGuard},
  time,
};

use crate::{
  entity::{opening_balance, transaction},
  prelude::*,
  sv::channel::{self, Channel},
  utils,
};

pub struct ChannelLocks {
  locks: DashMap<Channel, Arc<Mutex<()>>>,
  timeout: Duration,
}

impl ChannelLocks {
  pub fn new(timeout: Duration) -> Self {
    Self { locks: DashMap::new(), timeout }
  }

  /// Waits for exclusive access to `channel`, surfacing a retryable
  /// `Error::Conflict` if the channel stays busy past the timeout.
  pub async fn acquire(&self, channel: Channel) -> Result<OwnedMutexGuard<()>> {
    let lock = self.locks.entry(channel).or_default().clone();

    time::timeout(self.timeout, lock.lock_owned()).await.map_err(|_| {
      warn!("Timed out waiting for channel {channel}");
      Error::Conflict
    })
  }
}

/// Opening balance for the day, zero if none was entered.
pub async fn opening<C: ConnectionTrait>(
  conn: &C,
  channel: Channel,
  date: Date,
) -> Result<Money> {
  let row = opening_balance::Entity::find_by_id((date, channel.key()))
    .one(conn)
    .await?;
  Ok(row.map(|row| Money(row.amount)).unwrap_or_default())
}

/// Transactions created within the UTC calendar day, newest first.
pub async fn transactions_on<C: ConnectionTrait>(
  conn: &C,
  date: Date,
) -> Result<Vec<transaction::Model>> {
  let (start, end) = utils::day_bounds(date);

  Ok(
    transaction::Entity::find()
      .filter(transaction::Column::CreatedAt.gte(start))
      .filter(transaction::Column::CreatedAt.lt(end))
      .order_by_desc(transaction::Column::CreatedAt)
      .order_by_desc(transaction::Column::Id)
      .all(conn)
      .await?,
  )
}

/// `opening + inflow - outflow` for the channel on `date`.
pub async fn available<C: ConnectionTrait>(
  conn: &C,
  channel: Channel,
  date: Date,
) -> Result<Money> {
  let opening = opening(conn, channel, date).await?;
  let txs = transactions_on(conn, date).await?;
  let flow = channel::tally(&txs)?.remove(&channel).unwrap_or_default();

  opening.checked_add(flow.net()).ok_or(Error::InvalidAmount)
}

/// Admits an outgoing transaction already written inside `conn`'s database
/// transaction. The channel must stay at or above zero with it included.
/// Returns what was available before it.
pub async fn authorize<C: ConnectionTrait>(
  conn: &C,
  channel: Channel,
  tx: &transaction::Model,
) -> Result<Money> {
  let amount = Money(tx.amount);
  let remaining = available(conn, channel, tx.created_at.date()).await?;
  let available = remaining.checked_add(amount).ok_or(Error::InvalidAmount)?;

  if remaining.is_negative() {
    let name = channel.name(conn).await?;
    warn!("Rejected {amount} from {name}: only {available} available");
    return Err(Error::InsufficientFunds { channel: name, available });
  }

  Ok(available)
}
