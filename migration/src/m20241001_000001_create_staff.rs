use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Staff::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Staff::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Staff::Name).string().not_null())
          .col(
            ColumnDef::new(Staff::Role)
              .string()
              .not_null()
              .default("cashier"),
          )
          .col(ColumnDef::new(Staff::Active).boolean().not_null().default(true))
          .col(ColumnDef::new(Staff::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Staff::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Staff {
  Table,
  Id,
  Name,
  Role,
  Active,
  CreatedAt,
}
