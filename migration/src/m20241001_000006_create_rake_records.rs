use sea_orm_migration::prelude::*;

use super::m20241001_000002_create_players::Players;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(RakeRecords::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(RakeRecords::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(RakeRecords::TableSessionId)
              .big_integer()
              .not_null(),
          )
          .col(ColumnDef::new(RakeRecords::PotAmount).big_integer().not_null())
          .col(ColumnDef::new(RakeRecords::RakeAmount).big_integer().not_null())
          .col(
            ColumnDef::new(RakeRecords::TipAmount)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(RakeRecords::PlayerId).integer().null())
          .col(ColumnDef::new(RakeRecords::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_rake_records_player")
              .from(RakeRecords::Table, RakeRecords::PlayerId)
              .to(Players::Table, Players::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_rake_records_session")
          .table(RakeRecords::Table)
          .col(RakeRecords::TableSessionId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_rake_records_created_at")
          .table(RakeRecords::Table)
          .col(RakeRecords::CreatedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(RakeRecords::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum RakeRecords {
  Table,
  Id,
  TableSessionId,
  PotAmount,
  RakeAmount,
  TipAmount,
  PlayerId,
  CreatedAt,
}
