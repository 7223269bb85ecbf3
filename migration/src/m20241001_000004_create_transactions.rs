use sea_orm_migration::prelude::*;

use super::{
  m20241001_000001_create_staff::Staff,
  m20241001_000002_create_players::Players,
  m20241001_000003_create_bank_accounts::BankAccounts,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Transactions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Transactions::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Transactions::PlayerId).integer().not_null())
          .col(ColumnDef::new(Transactions::TxType).string().not_null())
          .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
          .col(ColumnDef::new(Transactions::PaymentMethod).string().null())
          .col(ColumnDef::new(Transactions::BankAccountId).integer().null())
          .col(ColumnDef::new(Transactions::Notes).string().null())
          .col(ColumnDef::new(Transactions::RecordedBy).integer().not_null())
          .col(ColumnDef::new(Transactions::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_transactions_player")
              .from(Transactions::Table, Transactions::PlayerId)
              .to(Players::Table, Players::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_transactions_bank_account")
              .from(Transactions::Table, Transactions::BankAccountId)
              .to(BankAccounts::Table, BankAccounts::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_transactions_staff")
              .from(Transactions::Table, Transactions::RecordedBy)
              .to(Staff::Table, Staff::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_transactions_created_at")
          .table(Transactions::Table)
          .col(Transactions::CreatedAt)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_transactions_player")
          .table(Transactions::Table)
          .col(Transactions::PlayerId)
          .col(Transactions::TxType)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Transactions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Transactions {
  Table,
  Id,
  PlayerId,
  TxType,
  Amount,
  PaymentMethod,
  BankAccountId,
  Notes,
  RecordedBy,
  CreatedAt,
}
