pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_staff;
mod m20241001_000002_create_players;
mod m20241001_000003_create_bank_accounts;
mod m20241001_000004_create_transactions;
mod m20241001_000005_create_opening_balances;
mod m20241001_000006_create_rake_records;
mod m20241001_000007_create_tip_collections;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20241001_000001_create_staff::Migration),
      Box::new(m20241001_000002_create_players::Migration),
      Box::new(m20241001_000003_create_bank_accounts::Migration),
      Box::new(m20241001_000004_create_transactions::Migration),
      Box::new(m20241001_000005_create_opening_balances::Migration),
      Box::new(m20241001_000006_create_rake_records::Migration),
      Box::new(m20241001_000007_create_tip_collections::Migration),
    ]
  }
}
