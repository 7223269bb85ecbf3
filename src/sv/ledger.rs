use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{
    PaymentMethod, TransactionType, bank_account, player, staff, transaction,
  },
  notify::{Change, Notifier},
  prelude::*,
  sv::{
    channel::Channel,
    solvency::{self, ChannelLocks},
  },
  utils,
};

/// Outgoing writes retry this many times when SQLite reports lock contention.
const WRITE_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Write request as it arrives from the cashier desk. `kind`, `amount` and
/// `payment_method` stay raw so that validation reports them in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
  pub player_id: i32,
  #[serde(rename = "type", default)]
  pub kind: Option<json::Value>,
  #[serde(default)]
  pub amount: Option<json::Value>,
  #[serde(default)]
  pub notes: Option<String>,
  #[serde(default)]
  pub payment_method: Option<String>,
  #[serde(default)]
  pub bank_account_id: Option<i32>,
}

/// Filter for listing transactions, newest first.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
  pub player_id: Option<i32>,
  pub kind: Option<TransactionType>,
  pub from: Option<Date>,
  pub to: Option<Date>,
  pub limit: Option<u64>,
}

impl TransactionQuery {
  pub fn with_player(mut self, player_id: i32) -> Self {
    self.player_id = Some(player_id);
    self
  }

  pub fn with_type(mut self, kind: TransactionType) -> Self {
    self.kind = Some(kind);
    self
  }

  /// Both ends are inclusive calendar days.
  pub fn with_date_range(mut self, from: Option<Date>, to: Option<Date>) -> Self {
    self.from = from;
    self.to = to;
    self
  }

  pub fn with_limit(mut self, limit: u64) -> Self {
    self.limit = Some(limit);
    self
  }
}

/// A transaction enriched with the names a cashier needs to read it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
  pub id: i32,
  pub player_id: i32,
  pub player_name: Option<String>,
  #[serde(rename = "type")]
  pub kind: TransactionType,
  pub amount: Money,
  pub payment_method: Option<PaymentMethod>,
  pub bank_account_id: Option<i32>,
  pub bank_account_name: Option<String>,
  pub channel: Option<Channel>,
  pub notes: Option<String>,
  pub recorded_by: i32,
  pub recorded_by_name: Option<String>,
  pub created_at: DateTime,
}

pub struct Ledger<'a> {
  db: &'a DatabaseConnection,
  locks: &'a ChannelLocks,
  notifier: &'a Notifier,
  default_limit: u64,
}

impl<'a> Ledger<'a> {
  pub fn new(
    db: &'a DatabaseConnection,
    locks: &'a ChannelLocks,
    notifier: &'a Notifier,
    default_limit: u64,
  ) -> Self {
    Self { db, locks, notifier, default_limit }
  }

  /// Validates and appends a transaction on behalf of `staff_id`.
  ///
  /// Cash-outs and withdrawals hold their channel's lock across the insert
  /// and the balance check, and both run in one database transaction, so two
  /// concurrent requests can never spend the same funds.
  pub async fn record(
    &self,
    staff_id: i32,
    req: NewTransaction,
  ) -> Result<transaction::Model> {
    let kind = parse_kind(req.kind.as_ref())?;

    let amount = parse_amount(req.amount.as_ref())
      .and_then(Money::from_decimal)
      .filter(|amount| amount.is_positive())
      .ok_or(Error::InvalidAmount)?;

    let method = req
      .payment_method
      .as_deref()
      .map(str::parse::<PaymentMethod>)
      .transpose()?;

    let bank_account_id = match method {
      Some(PaymentMethod::Bank) => {
        Some(req.bank_account_id.ok_or(Error::BankAccountRequired)?)
      }
      _ => None,
    };

    // payment method only means something for buy-ins and cash-outs
    let (method, bank_account_id) = if kind.takes_payment_method() {
      (Some(method.unwrap_or(PaymentMethod::Cash)), bank_account_id)
    } else {
      (None, None)
    };

    player::Entity::find_by_id(req.player_id)
      .one(self.db)
      .await?
      .ok_or(Error::PlayerNotFound)?;

    if let Some(id) = bank_account_id {
      let account = bank_account::Entity::find_by_id(id)
        .one(self.db)
        .await?
        .ok_or(Error::BankAccountNotFound)?;
      if !account.active {
        return Err(Error::BankAccountInactive);
      }
    }

    let channel = Channel::resolve(kind, method, bank_account_id);
    let notes = req.notes.filter(|notes| !notes.trim().is_empty());

    let model = transaction::ActiveModel {
      id: NotSet,
      player_id: Set(req.player_id),
      tx_type: Set(kind),
      amount: Set(amount.cents()),
      payment_method: Set(method),
      bank_account_id: Set(bank_account_id),
      notes: Set(notes),
      recorded_by: Set(staff_id),
      created_at: NotSet,
    };

    let tx = match channel {
      Some(channel) if kind.is_outgoing() => {
        let _guard = self.locks.acquire(channel).await?;
        self.record_outgoing(channel, model).await?
      }
      _ => {
        let now = Utc::now().naive_utc();
        transaction::ActiveModel { created_at: Set(now), ..model }
          .insert(self.db)
          .await?
      }
    };

    match channel {
      Some(channel) => info!(
        "Recorded {:?} #{} of {} on {} by staff {}",
        tx.tx_type, tx.id, amount, channel, staff_id
      ),
      None => info!(
        "Recorded {:?} #{} of {} outside channels by staff {}",
        tx.tx_type, tx.id, amount, staff_id
      ),
    }

    self.notifier.bump(Change::Transaction);
    Ok(tx)
  }

  async fn record_outgoing(
    &self,
    channel: Channel,
    model: transaction::ActiveModel,
  ) -> Result<transaction::Model> {
    let mut attempt = 1;
    loop {
      match self.try_record_outgoing(channel, model.clone()).await {
        Err(Error::Conflict) if attempt < WRITE_ATTEMPTS => {
          debug!("Database busy on {channel}, attempt {attempt}");
          tokio::time::sleep(RETRY_BACKOFF * attempt).await;
          attempt += 1;
        }
        result => return result,
      }
    }
  }

  async fn try_record_outgoing(
    &self,
    channel: Channel,
    model: transaction::ActiveModel,
  ) -> Result<transaction::Model> {
    let txn = self.db.begin().await?;

    // insert before reading balances so the transaction holds the write lock
    let now = Utc::now().naive_utc();
    let tx = transaction::ActiveModel { created_at: Set(now), ..model }
      .insert(&txn)
      .await?;

    if let Err(err) = solvency::authorize(&txn, channel, &tx).await {
      txn.rollback().await?;
      return Err(err);
    }

    txn.commit().await?;
    Ok(tx)
  }

  pub async fn list(
    &self,
    query: &TransactionQuery,
  ) -> Result<Vec<TransactionView>> {
    let mut select = transaction::Entity::find();

    if let Some(player_id) = query.player_id {
      select = select.filter(transaction::Column::PlayerId.eq(player_id));
    }
    if let Some(kind) = query.kind {
      select = select.filter(transaction::Column::TxType.eq(kind));
    }
    if let Some(from) = query.from {
      let (start, _) = utils::day_bounds(from);
      select = select.filter(transaction::Column::CreatedAt.gte(start));
    }
    if let Some(to) = query.to {
      let (_, end) = utils::day_bounds(to);
      select = select.filter(transaction::Column::CreatedAt.lt(end));
    }

    let txs = select
      .order_by_desc(transaction::Column::CreatedAt)
      .order_by_desc(transaction::Column::Id)
      .limit(query.limit.unwrap_or(self.default_limit))
      .all(self.db)
      .await?;

    enrich(self.db, txs).await
  }
}

fn parse_kind(kind: Option<&json::Value>) -> Result<TransactionType> {
  kind.and_then(json::Value::as_str).ok_or(Error::InvalidType)?.parse()
}

/// Accepts `"12.50"` as well as `12.5`; anything else is not an amount.
fn parse_amount(amount: Option<&json::Value>) -> Option<Decimal> {
  match amount? {
    json::Value::String(amount) => amount.trim().parse().ok(),
    json::Value::Number(amount) => {
      let amount = amount.to_string();
      amount
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&amount))
        .ok()
    }
    _ => None,
  }
}

/// Attaches player, staff and bank account names, preserving order.
pub async fn enrich<C: ConnectionTrait>(
  conn: &C,
  txs: Vec<transaction::Model>,
) -> Result<Vec<TransactionView>> {
  let player_ids: HashSet<i32> = txs.iter().map(|tx| tx.player_id).collect();
  let staff_ids: HashSet<i32> = txs.iter().map(|tx| tx.recorded_by).collect();
  let bank_ids: HashSet<i32> =
    txs.iter().filter_map(|tx| tx.bank_account_id).collect();

  let players: HashMap<i32, String> = player::Entity::find()
    .filter(player::Column::Id.is_in(player_ids))
    .all(conn)
    .await?
    .into_iter()
    .map(|player| (player.id, player.full_name()))
    .collect();

  let staff: HashMap<i32, String> = staff::Entity::find()
    .filter(staff::Column::Id.is_in(staff_ids))
    .all(conn)
    .await?
    .into_iter()
    .map(|staff| (staff.id, staff.name))
    .collect();

  let banks: HashMap<i32, String> = bank_account::Entity::find()
    .filter(bank_account::Column::Id.is_in(bank_ids))
    .all(conn)
    .await?
    .into_iter()
    .map(|bank| (bank.id, bank.name))
    .collect();

  Ok(
    txs
      .into_iter()
      .map(|tx| TransactionView {
        player_name: players.get(&tx.player_id).cloned(),
        recorded_by_name: staff.get(&tx.recorded_by).cloned(),
        bank_account_name: tx
          .bank_account_id
          .and_then(|id| banks.get(&id).cloned()),
        channel: Channel::of(&tx),
        id: tx.id,
        player_id: tx.player_id,
        kind: tx.tx_type,
        amount: Money(tx.amount),
        payment_method: tx.payment_method,
        bank_account_id: tx.bank_account_id,
        notes: tx.notes,
        recorded_by: tx.recorded_by,
        created_at: tx.created_at,
      })
      .collect(),
  )
}
