use sea_orm_migration::prelude::*;

use super::m20241001_000001_create_staff::Staff;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(TipCollections::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(TipCollections::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(TipCollections::TableId).big_integer().not_null())
          .col(ColumnDef::new(TipCollections::Amount).big_integer().not_null())
          .col(ColumnDef::new(TipCollections::Notes).string().null())
          .col(
            ColumnDef::new(TipCollections::CollectedBy)
              .integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(TipCollections::CreatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_tip_collections_staff")
              .from(TipCollections::Table, TipCollections::CollectedBy)
              .to(Staff::Table, Staff::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_tip_collections_created_at")
          .table(TipCollections::Table)
          .col(TipCollections::CreatedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(TipCollections::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum TipCollections {
  Table,
  Id,
  TableId,
  Amount,
  Notes,
  CollectedBy,
  CreatedAt,
}
