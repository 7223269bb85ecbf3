use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{player, rake_record},
  notify::{Change, Notifier},
  prelude::*,
  utils,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRakeRecord {
  pub table_session_id: i64,
  pub pot_amount: Decimal,
  pub rake_amount: Decimal,
  #[serde(default)]
  pub tip_amount: Option<Decimal>,
  #[serde(default)]
  pub player_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RakeView {
  pub id: i32,
  pub table_session_id: i64,
  pub pot_amount: Money,
  pub rake_amount: Money,
  pub tip_amount: Money,
  pub player_id: Option<i32>,
  pub created_at: DateTime,
}

impl From<rake_record::Model> for RakeView {
  fn from(record: rake_record::Model) -> Self {
    Self {
      id: record.id,
      table_session_id: record.table_session_id,
      pot_amount: Money(record.pot_amount),
      rake_amount: Money(record.rake_amount),
      tip_amount: Money(record.tip_amount),
      player_id: record.player_id,
      created_at: record.created_at,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRake {
  pub records: Vec<RakeView>,
  pub total_rake: Money,
  pub total_pots: Money,
}

pub const SESSION_RECORDS: u64 = 50;

pub struct Rake<'a> {
  db: &'a DatabaseConnection,
  notifier: &'a Notifier,
}

impl<'a> Rake<'a> {
  pub fn new(db: &'a DatabaseConnection, notifier: &'a Notifier) -> Self {
    Self { db, notifier }
  }

  pub async fn record(&self, req: NewRakeRecord) -> Result<rake_record::Model> {
    let non_negative = |amount: Decimal| {
      Money::from_decimal(amount)
        .filter(|amount| !amount.is_negative())
        .ok_or(Error::InvalidAmount)
    };

    let pot = non_negative(req.pot_amount)?;
    let rake = non_negative(req.rake_amount)?;
    let tip = non_negative(req.tip_amount.unwrap_or_default())?;

    if let Some(player_id) = req.player_id {
      player::Entity::find_by_id(player_id)
        .one(self.db)
        .await?
        .ok_or(Error::PlayerNotFound)?;
    }

    // soft check, dealers sometimes enter the rake before the final pot
    if pot < rake + tip {
      warn!(
        "Rake {} + tip {} exceeds pot {} in session {}",
        rake, tip, pot, req.table_session_id
      );
    }

    let record = rake_record::ActiveModel {
      id: NotSet,
      table_session_id: Set(req.table_session_id),
      pot_amount: Set(pot.cents()),
      rake_amount: Set(rake.cents()),
      tip_amount: Set(tip.cents()),
      player_id: Set(req.player_id),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    debug!(
      "Rake #{} of {} recorded for session {}",
      record.id, rake, record.table_session_id
    );
    self.notifier.bump(Change::Rake);
    Ok(record)
  }

  /// Latest records of a table session with their totals.
  pub async fn by_session(&self, table_session_id: i64) -> Result<SessionRake> {
    let records = rake_record::Entity::find()
      .filter(rake_record::Column::TableSessionId.eq(table_session_id))
      .order_by_desc(rake_record::Column::CreatedAt)
      .order_by_desc(rake_record::Column::Id)
      .limit(SESSION_RECORDS)
      .all(self.db)
      .await?;

    let total_rake = records.iter().map(|r| Money(r.rake_amount)).sum();
    let total_pots = records.iter().map(|r| Money(r.pot_amount)).sum();

    Ok(SessionRake {
      records: records.into_iter().map(RakeView::from).collect(),
      total_rake,
      total_pots,
    })
  }
}

/// Rake collected within the UTC calendar day.
pub async fn total_on<C: ConnectionTrait>(conn: &C, date: Date) -> Result<Money> {
  let (start, end) = utils::day_bounds(date);

  let total: Option<Option<i64>> = rake_record::Entity::find()
    .select_only()
    .column_as(Expr::col(rake_record::Column::RakeAmount).sum(), "total")
    .filter(rake_record::Column::CreatedAt.gte(start))
    .filter(rake_record::Column::CreatedAt.lt(end))
    .into_tuple()
    .one(conn)
    .await?;

  Ok(Money(total.flatten().unwrap_or(0)))
}
