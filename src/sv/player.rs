use serde::Deserialize;

use crate::{
  entity::player,
  notify::{Change, Notifier},
  prelude::*,
};

pub const SEARCH_LIMIT: u64 = 50;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
  pub first_name: String,
  pub last_name: String,
  #[serde(default)]
  pub rakeback_percent: Option<f64>,
}

pub struct Players<'a> {
  db: &'a DatabaseConnection,
  notifier: &'a Notifier,
}

impl<'a> Players<'a> {
  pub fn new(db: &'a DatabaseConnection, notifier: &'a Notifier) -> Self {
    Self { db, notifier }
  }

  pub async fn create(&self, req: NewPlayer) -> Result<player::Model> {
    let first_name = req.first_name.trim();
    let last_name = req.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
      return Err(Error::InvalidArgs("First and last name are required".into()));
    }
    let percent = valid_percent(req.rakeback_percent.unwrap_or(0.0))?;

    let player = player::ActiveModel {
      id: NotSet,
      first_name: Set(first_name.into()),
      last_name: Set(last_name.into()),
      rakeback_percent: Set(percent),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    debug!("Player #{} {} created", player.id, player.full_name());
    self.notifier.bump(Change::Player);
    Ok(player)
  }

  pub async fn by_id(&self, id: i32) -> Result<player::Model> {
    player::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::PlayerNotFound)
  }

  /// Case-insensitive match on either name; an empty query lists everyone.
  pub async fn search(&self, query: &str) -> Result<Vec<player::Model>> {
    let query = query.trim();
    let mut select = player::Entity::find();
    if !query.is_empty() {
      select = select.filter(
        player::Column::FirstName
          .contains(query)
          .or(player::Column::LastName.contains(query)),
      );
    }

    let players = select
      .order_by_asc(player::Column::FirstName)
      .order_by_asc(player::Column::LastName)
      .limit(SEARCH_LIMIT)
      .all(self.db)
      .await?;
    Ok(players)
  }

  /// Changes apply retroactively to all rake the player has contributed.
  pub async fn set_rakeback_percent(
    &self,
    id: i32,
    percent: f64,
  ) -> Result<player::Model> {
    let percent = valid_percent(percent)?;
    let player = self.by_id(id).await?;
    let previous = player.rakeback_percent;

    let player =
      player::ActiveModel { rakeback_percent: Set(percent), ..player.into() }
        .update(self.db)
        .await?;

    info!(
      "Rakeback for player #{} changed from {}% to {}%",
      player.id, previous, percent
    );
    self.notifier.bump(Change::Player);
    Ok(player)
  }
}

fn valid_percent(percent: f64) -> Result<f64> {
  if !(0.0..=100.0).contains(&percent) {
    return Err(Error::InvalidArgs(
      "Rakeback percent must be between 0 and 100".into(),
    ));
  }
  Ok(percent)
}
