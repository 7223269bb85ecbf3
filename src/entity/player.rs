use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{rake_record, transaction};

/// Only the fields the ledger reads; the full profile lives in the player
/// directory.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
#[serde(rename_all = "camelCase")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub first_name: String,
  pub last_name: String,
  pub rakeback_percent: f64,
  pub created_at: DateTime,
}

impl Model {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "transaction::Entity")]
  Transactions,
  #[sea_orm(has_many = "rake_record::Entity")]
  RakeRecords,
}

impl Related<transaction::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Transactions.def()
  }
}

impl Related<rake_record::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::RakeRecords.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
