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
          .table(OpeningBalances::Table)
          .if_not_exists()
          .col(ColumnDef::new(OpeningBalances::Date).date().not_null())
          .col(ColumnDef::new(OpeningBalances::Channel).string().not_null())
          .col(
            ColumnDef::new(OpeningBalances::Amount)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(OpeningBalances::Time).string().not_null())
          .col(ColumnDef::new(OpeningBalances::SetBy).integer().not_null())
          .col(
            ColumnDef::new(OpeningBalances::UpdatedAt)
              .date_time()
              .not_null(),
          )
          .primary_key(
            Index::create()
              .col(OpeningBalances::Date)
              .col(OpeningBalances::Channel),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_opening_balances_staff")
              .from(OpeningBalances::Table, OpeningBalances::SetBy)
              .to(Staff::Table, Staff::Id),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(OpeningBalances::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum OpeningBalances {
  Table,
  Date,
  Channel,
  Amount,
  Time,
  SetBy,
  UpdatedAt,
}
