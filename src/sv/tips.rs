use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};

use crate::{
  entity::tip_collection,
  notify::{Change, Notifier},
  prelude::*,
  utils,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTipCollection {
  pub table_id: i64,
  pub amount: Decimal,
  #[serde(default)]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipView {
  pub id: i32,
  pub table_id: i64,
  pub amount: Money,
  pub notes: Option<String>,
  pub collected_by: i32,
  pub created_at: DateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableTips {
  pub table_id: i64,
  pub total: Money,
  pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTips {
  pub date: Date,
  pub grand_total: Money,
  pub by_table: Vec<TableTips>,
  pub collections: Vec<TipView>,
}

impl From<tip_collection::Model> for TipView {
  fn from(tip: tip_collection::Model) -> Self {
    Self {
      id: tip.id,
      table_id: tip.table_id,
      amount: Money(tip.amount),
      notes: tip.notes,
      collected_by: tip.collected_by,
      created_at: tip.created_at,
    }
  }
}

pub struct Tips<'a> {
  db: &'a DatabaseConnection,
  notifier: &'a Notifier,
}

impl<'a> Tips<'a> {
  pub fn new(db: &'a DatabaseConnection, notifier: &'a Notifier) -> Self {
    Self { db, notifier }
  }

  pub async fn collect(
    &self,
    staff_id: i32,
    req: NewTipCollection,
  ) -> Result<tip_collection::Model> {
    let amount = Money::from_decimal(req.amount)
      .filter(|amount| amount.is_positive())
      .ok_or(Error::InvalidAmount)?;

    let tip = tip_collection::ActiveModel {
      id: NotSet,
      table_id: Set(req.table_id),
      amount: Set(amount.cents()),
      notes: Set(req.notes.filter(|notes| !notes.trim().is_empty())),
      collected_by: Set(staff_id),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    info!("Collected {} in tips from table {}", amount, tip.table_id);
    self.notifier.bump(Change::Tip);
    Ok(tip)
  }

  pub async fn on(&self, date: Date) -> Result<DailyTips> {
    let (start, end) = utils::day_bounds(date);

    let tips = tip_collection::Entity::find()
      .filter(tip_collection::Column::CreatedAt.gte(start))
      .filter(tip_collection::Column::CreatedAt.lt(end))
      .order_by_desc(tip_collection::Column::CreatedAt)
      .order_by_desc(tip_collection::Column::Id)
      .all(self.db)
      .await?;

    let mut tables: BTreeMap<i64, TableTips> = BTreeMap::new();
    for tip in &tips {
      let entry = tables.entry(tip.table_id).or_insert(TableTips {
        table_id: tip.table_id,
        total: Money::ZERO,
        count: 0,
      });
      entry.total = entry
        .total
        .checked_add(Money(tip.amount))
        .ok_or(Error::InvalidAmount)?;
      entry.count += 1;
    }

    let grand_total = Money::checked_sum(tables.values().map(|t| t.total))
      .ok_or(Error::InvalidAmount)?;

    Ok(DailyTips {
      date,
      grand_total,
      by_table: tables.into_values().collect(),
      collections: tips.into_iter().map(TipView::from).collect(),
    })
  }
}

/// Tips collected within the UTC calendar day.
pub async fn total_on<C: ConnectionTrait>(conn: &C, date: Date) -> Result<Money> {
  let (start, end) = utils::day_bounds(date);

  let total: Option<Option<i64>> = tip_collection::Entity::find()
    .select_only()
    .column_as(Expr::col(tip_collection::Column::Amount).sum(), "total")
    .filter(tip_collection::Column::CreatedAt.gte(start))
    .filter(tip_collection::Column::CreatedAt.lt(end))
    .into_tuple()
    .one(conn)
    .await?;

  Ok(Money(total.flatten().unwrap_or(0)))
}
