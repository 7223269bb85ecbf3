use sea_orm::ConnectOptions;

use crate::{
  config::Config,
  notify::Notifier,
  prelude::*,
  sv::{self, ChannelLocks, Services},
};

pub struct AppState {
  pub config: Config,
  pub db: DatabaseConnection,
  pub locks: ChannelLocks,
  pub notifier: Notifier,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.sqlx_logging(false);

    let db = Database::connect(opts).await?;
    Self::prepare(config, db).await
  }

  /// Migrates and makes sure somebody can log in.
  pub async fn prepare(
    config: Config,
    db: DatabaseConnection,
  ) -> anyhow::Result<Self> {
    Migrator::up(&db, None).await?;

    sv::Staff::new(&db).ensure_bootstrap_admin(&config.bootstrap_admin).await?;

    Ok(Self::with_db(config, db))
  }

  pub fn with_db(config: Config, db: DatabaseConnection) -> Self {
    Self {
      locks: ChannelLocks::new(config.channel_lock_timeout),
      notifier: Notifier::default(),
      config,
      db,
    }
  }

  pub fn sv(&self) -> Services<'_> {
    let (db, notifier) = (&self.db, &self.notifier);

    Services {
      ledger: sv::Ledger::new(
        db,
        &self.locks,
        notifier,
        self.config.transactions_limit,
      ),
      openings: sv::Openings::new(db, notifier),
      report: sv::Report::new(db),
      rake: sv::Rake::new(db, notifier),
      rakeback: sv::Rakeback::new(db),
      tips: sv::Tips::new(db, notifier),
      banks: sv::BankAccounts::new(db, notifier),
      players: sv::Players::new(db, notifier),
      staff: sv::Staff::new(db),
    }
  }
}
