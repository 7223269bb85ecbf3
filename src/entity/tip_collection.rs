use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tip_collections")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub table_id: i64,
  pub amount: i64,
  pub notes: Option<String>,
  pub collected_by: i32,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::staff::Entity",
    from = "Column::CollectedBy",
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
