//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DbBackend, NotSet, Schema, Set,
  };

  use crate::{
    entity::*,
    prelude::{Date, DateTime, Utc},
    sv::channel::Channel,
  };

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    // a second pooled connection would open a different in-memory database
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts).await.unwrap();
    create_tables(&db).await;
    db
  }

  pub async fn create_tables(db: &DatabaseConnection) {
    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(staff::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(player::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(bank_account::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(transaction::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(opening_balance::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(rake_record::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(tip_collection::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
  }

  pub struct Fixtures {
    pub admin: staff::Model,
    pub cashier: staff::Model,
    pub player: player::Model,
    pub bank: bank_account::Model,
  }

  pub async fn fixtures(db: &DatabaseConnection) -> Fixtures {
    Fixtures {
      admin: add_staff(db, "Alice", StaffRole::Admin).await,
      cashier: add_staff(db, "Carl", StaffRole::Cashier).await,
      player: add_player(db, "Pat", "Doyle", 0.0).await,
      bank: add_bank(db, "Main Bank").await,
    }
  }

  pub async fn add_staff(
    db: &DatabaseConnection,
    name: &str,
    role: StaffRole,
  ) -> staff::Model {
    staff::ActiveModel {
      id: NotSet,
      name: Set(name.into()),
      role: Set(role),
      active: Set(true),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn add_player(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
    rakeback_percent: f64,
  ) -> player::Model {
    player::ActiveModel {
      id: NotSet,
      first_name: Set(first_name.into()),
      last_name: Set(last_name.into()),
      rakeback_percent: Set(rakeback_percent),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn add_bank(db: &DatabaseConnection, name: &str) -> bank_account::Model {
    bank_account::ActiveModel {
      id: NotSet,
      name: Set(name.into()),
      active: Set(true),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn opening(
    db: &DatabaseConnection,
    date: Date,
    channel: Channel,
    cents: i64,
  ) -> opening_balance::Model {
    opening_balance::ActiveModel {
      date: Set(date),
      channel: Set(channel.key()),
      amount: Set(cents),
      time: Set("08:00".into()),
      set_by: Set(1),
      updated_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  /// Inserts a cash (or deposits-channel) transaction at a fixed time,
  /// bypassing the ledger's validation.
  pub async fn tx_at<C: ConnectionTrait>(
    db: &C,
    fx: &Fixtures,
    tx_type: TransactionType,
    cents: i64,
    created_at: DateTime,
  ) -> transaction::Model {
    let method = tx_type.takes_payment_method().then_some(PaymentMethod::Cash);
    insert_tx(db, fx, tx_type, cents, method, None, created_at).await
  }

  pub async fn bank_tx_at<C: ConnectionTrait>(
    db: &C,
    fx: &Fixtures,
    tx_type: TransactionType,
    cents: i64,
    created_at: DateTime,
  ) -> transaction::Model {
    let bank = Some(fx.bank.id);
    insert_tx(db, fx, tx_type, cents, Some(PaymentMethod::Bank), bank, created_at)
      .await
  }

  async fn insert_tx<C: ConnectionTrait>(
    db: &C,
    fx: &Fixtures,
    tx_type: TransactionType,
    cents: i64,
    payment_method: Option<PaymentMethod>,
    bank_account_id: Option<i32>,
    created_at: DateTime,
  ) -> transaction::Model {
    transaction::ActiveModel {
      id: NotSet,
      player_id: Set(fx.player.id),
      tx_type: Set(tx_type),
      amount: Set(cents),
      payment_method: Set(payment_method),
      bank_account_id: Set(bank_account_id),
      notes: Set(None),
      recorded_by: Set(fx.cashier.id),
      created_at: Set(created_at),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn rake_at(
    db: &DatabaseConnection,
    player_id: Option<i32>,
    rake_cents: i64,
    created_at: DateTime,
  ) -> rake_record::Model {
    rake_record::ActiveModel {
      id: NotSet,
      table_session_id: Set(1),
      pot_amount: Set(rake_cents * 20),
      rake_amount: Set(rake_cents),
      tip_amount: Set(0),
      player_id: Set(player_id),
      created_at: Set(created_at),
    }
    .insert(db)
    .await
    .unwrap()
  }
}
