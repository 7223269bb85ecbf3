use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(BankAccounts::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(BankAccounts::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(BankAccounts::Name).string().not_null())
          .col(
            ColumnDef::new(BankAccounts::Active)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(BankAccounts::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(BankAccounts::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum BankAccounts {
  Table,
  Id,
  Name,
  Active,
  CreatedAt,
}
