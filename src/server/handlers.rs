use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{
    IntoResponse, Response,
    sse::{Event, KeepAlive, Sse},
  },
};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;

use super::{
  auth::CurrentStaff,
  extract::{Json, Query},
};
use crate::{
  entity::{StaffRole, TransactionType, bank_account, player, staff},
  prelude::*,
  state::AppState,
  sv::{
    ledger::{self, NewTransaction, TransactionQuery, TransactionView},
    opening::{OpeningView, SetOpenings},
    player::NewPlayer,
    rake::{NewRakeRecord, RakeView, SessionRake},
    report::DailyReport,
    staff::NewStaff,
    tips::{DailyTips, NewTipCollection, TipView},
  },
  utils,
};

type App = State<Arc<AppState>>;

const CASHIERS: &[StaffRole] = &[StaffRole::Cashier];
const FLOOR: &[StaffRole] = &[StaffRole::Dealer, StaffRole::Pitboss];

pub async fn health() -> &'static str {
  "OK"
}

#[derive(Serialize)]
pub struct Version {
  version: u64,
}

pub async fn version(State(app): App) -> Json<Version> {
  Json(Version { version: app.notifier.version() })
}

/// Pushes every `Update` as it happens. Lagging clients skip ahead and can
/// resync through the version endpoint.
pub async fn changes(
  State(app): App,
  _staff: CurrentStaff,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
  let rx = app.notifier.subscribe();

  let updates = stream::unfold(rx, |mut rx| async move {
    loop {
      match rx.recv().await {
        Ok(update) => return Some((Event::default().json_data(update), rx)),
        Err(RecvError::Lagged(skipped)) => {
          debug!("Change stream lagged by {skipped} updates");
        }
        Err(RecvError::Closed) => return None,
      }
    }
  });

  Sse::new(updates).keep_alive(KeepAlive::default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsParams {
  player_id: Option<i32>,
  #[serde(rename = "type")]
  kind: Option<String>,
  date_from: Option<Date>,
  date_to: Option<Date>,
  limit: Option<u64>,
}

pub async fn list_transactions(
  State(app): App,
  _staff: CurrentStaff,
  Query(params): Query<TransactionsParams>,
) -> Result<Json<Vec<TransactionView>>> {
  let mut query = TransactionQuery::default()
    .with_date_range(params.date_from, params.date_to);
  if let Some(player_id) = params.player_id {
    query = query.with_player(player_id);
  }
  if let Some(kind) = params.kind {
    query = query.with_type(kind.parse::<TransactionType>()?);
  }
  if let Some(limit) = params.limit {
    query = query.with_limit(limit);
  }

  Ok(Json(app.sv().ledger.list(&query).await?))
}

pub async fn record_transaction(
  State(app): App,
  staff: CurrentStaff,
  Json(req): Json<NewTransaction>,
) -> Result<(StatusCode, Json<TransactionView>)> {
  staff.require(CASHIERS)?;

  let tx = app.sv().ledger.record(staff.id(), req).await?;
  let view = ledger::enrich(&app.db, vec![tx])
    .await?
    .pop()
    .ok_or_else(|| Error::Internal("recorded transaction vanished".into()))?;

  Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
  date: Option<Date>,
}

pub async fn daily_report(
  State(app): App,
  _staff: CurrentStaff,
  Query(params): Query<DateParams>,
) -> Result<Json<DailyReport>> {
  let date = params.date.unwrap_or_else(utils::today);
  Ok(Json(app.sv().report.build(date).await?))
}

pub async fn opening_balances(
  State(app): App,
  _staff: CurrentStaff,
  Query(params): Query<DateParams>,
) -> Result<Json<Vec<OpeningView>>> {
  let date = params.date.unwrap_or_else(utils::today);
  Ok(Json(app.sv().openings.on(date).await?))
}

pub async fn set_opening_balances(
  State(app): App,
  staff: CurrentStaff,
  Json(req): Json<SetOpenings>,
) -> Result<Json<Vec<OpeningView>>> {
  staff.require_admin()?;
  Ok(Json(app.sv().openings.set(staff.id(), req).await?))
}

pub async fn record_rake(
  State(app): App,
  staff: CurrentStaff,
  Json(req): Json<NewRakeRecord>,
) -> Result<(StatusCode, Json<RakeView>)> {
  staff.require(FLOOR)?;
  let record = app.sv().rake.record(req).await?;
  Ok((StatusCode::CREATED, Json(record.into())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RakeParams {
  table_session_id: i64,
}

pub async fn session_rake(
  State(app): App,
  _staff: CurrentStaff,
  Query(params): Query<RakeParams>,
) -> Result<Json<SessionRake>> {
  Ok(Json(app.sv().rake.by_session(params.table_session_id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RakebackParams {
  player_id: Option<i32>,
}

pub async fn rakeback(
  State(app): App,
  _staff: CurrentStaff,
  Query(params): Query<RakebackParams>,
) -> Result<Response> {
  let rakeback = app.sv().rakeback;
  let response = match params.player_id {
    Some(player_id) => {
      Json(rakeback.for_player(player_id).await?).into_response()
    }
    None => Json(rakeback.all().await?).into_response(),
  };
  Ok(response)
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  q: String,
}

pub async fn search_players(
  State(app): App,
  _staff: CurrentStaff,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<player::Model>>> {
  Ok(Json(app.sv().players.search(&params.q).await?))
}

pub async fn create_player(
  State(app): App,
  staff: CurrentStaff,
  Json(req): Json<NewPlayer>,
) -> Result<(StatusCode, Json<player::Model>)> {
  staff.require(CASHIERS)?;
  if req.rakeback_percent.is_some() {
    staff.require_admin()?;
  }
  let player = app.sv().players.create(req).await?;
  Ok((StatusCode::CREATED, Json(player)))
}

pub async fn get_player(
  State(app): App,
  _staff: CurrentStaff,
  Path(id): Path<i32>,
) -> Result<Json<player::Model>> {
  Ok(Json(app.sv().players.by_id(id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRakeback {
  rakeback_percent: f64,
}

pub async fn set_rakeback_percent(
  State(app): App,
  staff: CurrentStaff,
  Path(id): Path<i32>,
  Json(req): Json<SetRakeback>,
) -> Result<Json<player::Model>> {
  staff.require_admin()?;
  let players = app.sv().players;
  let player = players.set_rakeback_percent(id, req.rakeback_percent).await?;
  Ok(Json(player))
}

pub async fn bank_accounts(
  State(app): App,
  _staff: CurrentStaff,
) -> Result<Json<Vec<bank_account::Model>>> {
  Ok(Json(app.sv().banks.active().await?))
}

#[derive(Debug, Deserialize)]
pub struct BankAccountName {
  name: String,
}

pub async fn create_bank_account(
  State(app): App,
  staff: CurrentStaff,
  Json(req): Json<BankAccountName>,
) -> Result<(StatusCode, Json<bank_account::Model>)> {
  staff.require_admin()?;
  let account = app.sv().banks.create(&req.name).await?;
  Ok((StatusCode::CREATED, Json(account)))
}

pub async fn rename_bank_account(
  State(app): App,
  staff: CurrentStaff,
  Path(id): Path<i32>,
  Json(req): Json<BankAccountName>,
) -> Result<Json<bank_account::Model>> {
  staff.require_admin()?;
  Ok(Json(app.sv().banks.rename(id, &req.name).await?))
}

pub async fn deactivate_bank_account(
  State(app): App,
  staff: CurrentStaff,
  Path(id): Path<i32>,
) -> Result<Json<bank_account::Model>> {
  staff.require_admin()?;
  Ok(Json(app.sv().banks.deactivate(id).await?))
}

pub async fn collect_tips(
  State(app): App,
  staff: CurrentStaff,
  Json(req): Json<NewTipCollection>,
) -> Result<(StatusCode, Json<TipView>)> {
  staff.require(CASHIERS)?;
  let tip = app.sv().tips.collect(staff.id(), req).await?;
  Ok((StatusCode::CREATED, Json(tip.into())))
}

pub async fn daily_tips(
  State(app): App,
  _staff: CurrentStaff,
  Query(params): Query<DateParams>,
) -> Result<Json<DailyTips>> {
  let date = params.date.unwrap_or_else(utils::today);
  Ok(Json(app.sv().tips.on(date).await?))
}

pub async fn list_staff(
  State(app): App,
  staff: CurrentStaff,
) -> Result<Json<Vec<staff::Model>>> {
  staff.require_admin()?;
  Ok(Json(app.sv().staff.all().await?))
}

pub async fn create_staff(
  State(app): App,
  staff: CurrentStaff,
  Json(req): Json<NewStaff>,
) -> Result<(StatusCode, Json<staff::Model>)> {
  staff.require_admin()?;
  let member = app.sv().staff.create(req).await?;
  Ok((StatusCode::CREATED, Json(member)))
}
