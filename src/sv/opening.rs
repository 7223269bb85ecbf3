use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{bank_account, opening_balance, staff},
  notify::{Change, Notifier},
  prelude::*,
  sv::channel::Channel,
};

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningEntry {
  pub channel: Channel,
  pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetOpenings {
  pub date: Date,
  pub time: String,
  pub balances: Vec<OpeningEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningView {
  pub date: Date,
  pub channel: Channel,
  pub amount: Money,
  pub time: String,
  pub set_by: i32,
  pub set_by_name: Option<String>,
  pub updated_at: DateTime,
}

pub struct Openings<'a> {
  db: &'a DatabaseConnection,
  notifier: &'a Notifier,
}

impl<'a> Openings<'a> {
  pub fn new(db: &'a DatabaseConnection, notifier: &'a Notifier) -> Self {
    Self { db, notifier }
  }

  /// Upserts one row per channel for the day. Saving the same day and
  /// channel again overwrites the amount.
  pub async fn set(
    &self,
    staff_id: i32,
    req: SetOpenings,
  ) -> Result<Vec<OpeningView>> {
    if req.time.trim().is_empty() || req.balances.is_empty() {
      return Err(Error::InvalidArgs("date, time, and balances required".into()));
    }

    let mut entries = Vec::with_capacity(req.balances.len());
    for entry in req.balances {
      let amount = Money::from_decimal(entry.amount)
        .filter(|amount| !amount.is_negative())
        .ok_or(Error::InvalidAmount)?;
      entries.push((entry.channel, amount));
    }

    let txn = self.db.begin().await?;

    for (channel, _) in &entries {
      if let Channel::Bank(id) = channel {
        bank_account::Entity::find_by_id(*id)
          .one(&txn)
          .await?
          .ok_or(Error::BankAccountNotFound)?;
      }
    }

    let now = Utc::now().naive_utc();
    let mut saved = Vec::with_capacity(entries.len());
    for (channel, amount) in entries {
      let existing = opening_balance::Entity::find_by_id((req.date, channel.key()))
        .one(&txn)
        .await?;

      let row = match existing {
        Some(row) => {
          opening_balance::ActiveModel {
            amount: Set(amount.cents()),
            time: Set(req.time.clone()),
            set_by: Set(staff_id),
            updated_at: Set(now),
            ..row.into()
          }
          .update(&txn)
          .await?
        }
        None => {
          opening_balance::ActiveModel {
            date: Set(req.date),
            channel: Set(channel.key()),
            amount: Set(amount.cents()),
            time: Set(req.time.clone()),
            set_by: Set(staff_id),
            updated_at: Set(now),
          }
          .insert(&txn)
          .await?
        }
      };
      saved.push(row);
    }

    txn.commit().await?;

    info!(
      "Opening balances for {} set by staff {}: {} channel(s)",
      req.date,
      staff_id,
      saved.len()
    );
    self.notifier.bump(Change::OpeningBalance);

    self.views(saved).await
  }

  pub async fn on(&self, date: Date) -> Result<Vec<OpeningView>> {
    let rows = opening_balance::Entity::find()
      .filter(opening_balance::Column::Date.eq(date))
      .all(self.db)
      .await?;

    let mut views = self.views(rows).await?;
    views.sort_by_key(|view| view.channel);
    Ok(views)
  }

  async fn views(
    &self,
    rows: Vec<opening_balance::Model>,
  ) -> Result<Vec<OpeningView>> {
    let staff_ids: HashSet<i32> = rows.iter().map(|row| row.set_by).collect();
    let names: HashMap<i32, String> = staff::Entity::find()
      .filter(staff::Column::Id.is_in(staff_ids))
      .all(self.db)
      .await?
      .into_iter()
      .map(|staff| (staff.id, staff.name))
      .collect();

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
      let channel = match row.channel.parse::<Channel>() {
        Ok(channel) => channel,
        Err(_) => {
          warn!("Skipping opening balance with unknown channel {}", row.channel);
          continue;
        }
      };
      views.push(OpeningView {
        date: row.date,
        channel,
        amount: Money(row.amount),
        set_by_name: names.get(&row.set_by).cloned(),
        time: row.time,
        set_by: row.set_by,
        updated_at: row.updated_at,
      });
    }
    Ok(views)
  }
}

/// All opening balances of a day keyed by channel.
pub async fn openings_on<C: ConnectionTrait>(
  conn: &C,
  date: Date,
) -> Result<BTreeMap<Channel, Money>> {
  let rows = opening_balance::Entity::find()
    .filter(opening_balance::Column::Date.eq(date))
    .all(conn)
    .await?;

  Ok(
    rows
      .into_iter()
      .filter_map(|row| {
        row.channel.parse().ok().map(|channel| (channel, Money(row.amount)))
      })
      .collect(),
  )
}
