use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Players::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Players::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Players::FirstName).string().not_null())
          .col(ColumnDef::new(Players::LastName).string().not_null())
          .col(
            ColumnDef::new(Players::RakebackPercent)
              .double()
              .not_null()
              .default(0.0),
          )
          .col(ColumnDef::new(Players::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_players_first_name")
          .table(Players::Table)
          .col(Players::FirstName)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Players::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Players {
  Table,
  Id,
  FirstName,
  LastName,
  RakebackPercent,
  CreatedAt,
}
