use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use sea_orm::sea_query::Expr;
use serde::Serialize;

use crate::{
  entity::{TransactionType, player, rake_record, transaction},
  prelude::*,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RakebackSummary {
  pub player_id: i32,
  pub player_name: String,
  pub rakeback_percent: f64,
  pub total_rake_contributed: Money,
  pub rakeback_earned: Money,
  pub total_paid_out: Money,
  /// Negative when more was paid out than the current percent earns.
  pub rakeback_balance: Money,
}

/// `contributed * percent / 100`, rounded to the cent half away from zero.
pub fn earned(contributed: Money, percent: f64) -> Result<Money> {
  let percent = Decimal::from_f64(percent)
    .ok_or_else(|| Error::Internal(format!("bad rakeback percent {percent}")))?;

  let earned = (contributed.to_decimal() * percent / Decimal::ONE_HUNDRED)
    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

  Money::from_decimal(earned)
    .ok_or_else(|| Error::Internal(format!("rakeback overflow: {earned}")))
}

pub struct Rakeback<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Rakeback<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn for_player(&self, player_id: i32) -> Result<RakebackSummary> {
    let player = player::Entity::find_by_id(player_id)
      .one(self.db)
      .await?
      .ok_or(Error::PlayerNotFound)?;

    let mut summaries = self.summarize(vec![player]).await?;
    summaries.pop().ok_or_else(|| Error::Internal("empty rakeback".into()))
  }

  /// Every player with a positive rakeback percent, by first name.
  pub async fn all(&self) -> Result<Vec<RakebackSummary>> {
    let players = player::Entity::find()
      .filter(player::Column::RakebackPercent.gt(0.0))
      .order_by_asc(player::Column::FirstName)
      .order_by_asc(player::Column::Id)
      .all(self.db)
      .await?;

    self.summarize(players).await
  }

  async fn summarize(
    &self,
    players: Vec<player::Model>,
  ) -> Result<Vec<RakebackSummary>> {
    let ids: Vec<i32> = players.iter().map(|player| player.id).collect();

    let contributed: HashMap<i32, i64> = rake_record::Entity::find()
      .select_only()
      .column(rake_record::Column::PlayerId)
      .column_as(Expr::col(rake_record::Column::RakeAmount).sum(), "total")
      .filter(rake_record::Column::PlayerId.is_in(ids.clone()))
      .group_by(rake_record::Column::PlayerId)
      .into_tuple::<(Option<i32>, Option<i64>)>()
      .all(self.db)
      .await?
      .into_iter()
      .filter_map(|(id, total)| Some((id?, total.unwrap_or(0))))
      .collect();

    let paid: HashMap<i32, i64> = transaction::Entity::find()
      .select_only()
      .column(transaction::Column::PlayerId)
      .column_as(Expr::col(transaction::Column::Amount).sum(), "total")
      .filter(transaction::Column::TxType.eq(TransactionType::RakebackPayout))
      .filter(transaction::Column::PlayerId.is_in(ids))
      .group_by(transaction::Column::PlayerId)
      .into_tuple::<(i32, Option<i64>)>()
      .all(self.db)
      .await?
      .into_iter()
      .map(|(id, total)| (id, total.unwrap_or(0)))
      .collect();

    players
      .into_iter()
      .map(|player| {
        let contributed =
          Money(contributed.get(&player.id).copied().unwrap_or(0));
        let paid = Money(paid.get(&player.id).copied().unwrap_or(0));
        let earned = earned(contributed, player.rakeback_percent)?;

        Ok(RakebackSummary {
          player_id: player.id,
          player_name: player.full_name(),
          rakeback_percent: player.rakeback_percent,
          total_rake_contributed: contributed,
          rakeback_earned: earned,
          total_paid_out: paid,
          rakeback_balance: earned - paid,
        })
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  fn at(h: u32) -> DateTime {
    Date::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(h, 0, 0).unwrap()
  }

  #[test]
  fn earned_rounds_to_cents() {
    assert_eq!(earned(Money(10000), 10.0).unwrap(), Money(1000));
    assert_eq!(earned(Money(333), 50.0).unwrap(), Money(167));
    assert_eq!(earned(Money(12345), 0.0).unwrap(), Money::ZERO);
    assert_eq!(earned(Money(999), 12.5).unwrap(), Money(125));
  }

  #[tokio::test]
  async fn balance_goes_negative_after_percent_cut() {
    let db = test_db::setup().await;
    let mut fx = test_db::fixtures(&db).await;
    fx.player = player::ActiveModel {
      rakeback_percent: Set(10.0),
      ..fx.player.into()
    }
    .update(&db)
    .await
    .unwrap();

    test_db::rake_at(&db, Some(fx.player.id), 6000, at(10)).await;
    test_db::rake_at(&db, Some(fx.player.id), 4000, at(11)).await;
    test_db::rake_at(&db, None, 9999, at(11)).await;
    test_db::tx_at(&db, &fx, TransactionType::RakebackPayout, 1000, at(12)).await;

    let rakeback = Rakeback::new(&db);
    let summary = rakeback.for_player(fx.player.id).await.unwrap();
    assert_eq!(summary.total_rake_contributed, Money(10000));
    assert_eq!(summary.rakeback_earned, Money(1000));
    assert_eq!(summary.total_paid_out, Money(1000));
    assert_eq!(summary.rakeback_balance, Money::ZERO);

    player::ActiveModel { rakeback_percent: Set(5.0), ..fx.player.clone().into() }
      .update(&db)
      .await
      .unwrap();

    let summary = rakeback.for_player(fx.player.id).await.unwrap();
    assert_eq!(summary.rakeback_earned, Money(500));
    assert_eq!(summary.rakeback_balance, Money(-500));
  }

  #[tokio::test]
  async fn all_lists_players_with_a_percent() {
    let db = test_db::setup().await;
    test_db::fixtures(&db).await;
    let zed = test_db::add_player(&db, "Zed", "Moss", 20.0).await;
    let amy = test_db::add_player(&db, "Amy", "Kerr", 5.0).await;
    test_db::rake_at(&db, Some(zed.id), 500, at(9)).await;

    let all = Rakeback::new(&db).all().await.unwrap();

    let ids: Vec<i32> = all.iter().map(|s| s.player_id).collect();
    assert_eq!(ids, vec![amy.id, zed.id]);
    assert_eq!(all[0].total_rake_contributed, Money::ZERO);
    assert_eq!(all[1].rakeback_earned, Money(100));
    assert_eq!(all[1].player_name, "Zed Moss");
  }

  #[tokio::test]
  async fn unknown_player_is_not_found() {
    let db = test_db::setup().await;

    let result = Rakeback::new(&db).for_player(7).await;

    assert!(matches!(result, Err(Error::PlayerNotFound)));
  }
}
