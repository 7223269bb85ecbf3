use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Keyed by `(date, channel)` so a second save for the same day and channel
/// can only ever overwrite. `channel` holds `Channel::key()`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "opening_balances")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub date: Date,
  #[sea_orm(primary_key, auto_increment = false)]
  pub channel: String,
  pub amount: i64,
  pub time: String,
  pub set_by: i32,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::staff::Entity",
    from = "Column::SetBy",
    to = "super::staff::Column::Id"
  )]
  Staff,
}

impl Related<super::staff::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Staff.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
