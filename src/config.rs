use std::env;

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub rate_per_second: u64,
  pub rate_burst: u32,
  /// How long a write waits for a busy channel before giving up with
  /// `Error::Conflict`.
  pub channel_lock_timeout: Duration,
  pub bootstrap_admin: String,
  pub transactions_limit: u64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: "sqlite:cardroom.db?mode=rwc".into(),
      port: 3000,
      rate_per_second: 2,
      rate_burst: 100,
      channel_lock_timeout: Duration::from_millis(5000),
      bootstrap_admin: "admin".into(),
      transactions_limit: 100,
    }
  }
}

impl Config {
  /// Reads overrides from the environment, falling back to defaults for
  /// anything unset or unparsable.
  pub fn from_env() -> Self {
    let default = Self::default();

    Self {
      database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),
      port: parse_var("PORT").unwrap_or(default.port),
      rate_per_second: parse_var("RATE_PER_SECOND")
        .unwrap_or(default.rate_per_second),
      rate_burst: parse_var("RATE_BURST").unwrap_or(default.rate_burst),
      channel_lock_timeout: parse_var("CHANNEL_LOCK_TIMEOUT_MS")
        .map(Duration::from_millis)
        .unwrap_or(default.channel_lock_timeout),
      bootstrap_admin: env::var("BOOTSTRAP_ADMIN")
        .unwrap_or(default.bootstrap_admin),
      transactions_limit: parse_var("TRANSACTIONS_LIMIT")
        .unwrap_or(default.transactions_limit),
    }
  }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
  let raw = env::var(key).ok()?;
  match raw.trim().parse() {
    Ok(value) => Some(value),
    Err(_) => {
      warn!("Ignoring invalid {key}={raw}");
      None
    }
  }
}
