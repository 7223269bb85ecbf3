mod auth;
mod extract;
mod handlers;

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
  Router,
  routing::{get, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

/// Binds the HTTP listener and serves in the background. Fails only if the
/// rate limiter config or the bind is invalid.
pub async fn start(app: Arc<AppState>) -> anyhow::Result<()> {
  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(app.config.rate_per_second)
      .burst_size(app.config.rate_burst)
      .finish()
      .context("Failed to build rate limiter config")?,
  );

  let governor_limiter = governor_conf.limiter().clone();

  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

  let router = routes()
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app)
    .into_make_service_with_connect_info::<SocketAddr>();

  let listener = tokio::net::TcpListener::bind(addr)
    .await
    .with_context(|| format!("Failed to bind {addr}"))?;

  info!("HTTP Server listening on {addr}");

  tokio::spawn(async move {
    if let Err(err) = axum::serve(listener, router).await {
      error!("HTTP server stopped: {err}");
    }
  });

  Ok(())
}

pub fn routes() -> Router<Arc<AppState>> {
  use handlers::*;

  Router::new()
    .route("/health", get(health))
    .route("/api/version", get(version))
    .route("/api/changes", get(changes))
    .route(
      "/api/transactions",
      get(list_transactions).post(record_transaction),
    )
    .route("/api/transactions/report", get(daily_report))
    .route(
      "/api/opening-balances",
      get(opening_balances).put(set_opening_balances),
    )
    .route("/api/rake", get(session_rake).post(record_rake))
    .route("/api/rakeback", get(rakeback))
    .route("/api/players", get(search_players).post(create_player))
    .route("/api/players/{id}", get(get_player))
    .route("/api/players/{id}/rakeback", put(set_rakeback_percent))
    .route(
      "/api/bank-accounts",
      get(bank_accounts).post(create_bank_account),
    )
    .route(
      "/api/bank-accounts/{id}",
      put(rename_bank_account).delete(deactivate_bank_account),
    )
    .route("/api/tips", get(daily_tips).post(collect_tips))
    .route("/api/staff", get(list_staff).post(create_staff))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
  };
  use tower::ServiceExt;

  use super::{auth::STAFF_HEADER, *};
  use crate::{
    config::Config,
    entity::StaffRole,
    sv::{Channel, test_utils::test_db},
  };

  async fn app() -> (Arc<AppState>, test_db::Fixtures) {
    let db = test_db::setup().await;
    let fx = test_db::fixtures(&db).await;
    (Arc::new(AppState::with_db(Config::default(), db)), fx)
  }

  async fn call(
    app: &Arc<AppState>,
    method: &str,
    uri: &str,
    staff: Option<i32>,
    body: Option<json::Value>,
  ) -> (StatusCode, json::Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(id) = staff {
      req = req.header(STAFF_HEADER, id.to_string());
    }
    let req = match body {
      Some(body) => req
        .header("content-type", "application/json")
        .body(Body::from(body.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();

    let res = routes().with_state(app.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = json::from_slice(&bytes).unwrap_or(json::Value::Null);
    (status, body)
  }

  #[tokio::test]
  async fn health_needs_no_staff() {
    let (app, _) = app().await;

    let (status, _) = call(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn rejects_unknown_staff() {
    let (app, _) = app().await;

    let (status, body) =
      call(&app, "GET", "/api/transactions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) =
      call(&app, "GET", "/api/transactions", Some(404), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn cash_out_over_the_drawer_is_unprocessable() {
    let (app, fx) = app().await;
    let today = crate::utils::today();
    test_db::opening(&app.db, today, Channel::Cash, 5000).await;

    let (status, body) = call(
      &app,
      "POST",
      "/api/transactions",
      Some(fx.cashier.id),
      Some(json::json!({
        "playerId": fx.player.id,
        "type": "CASH_OUT",
        "amount": "100.00",
      })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INSUFFICIENT_FUNDS");
    assert_eq!(body["error"], "Insufficient funds in Cash. Available: $50.00");
    assert_eq!(body["available"], "50.00");

    let (status, body) = call(
      &app,
      "POST",
      "/api/transactions",
      Some(fx.cashier.id),
      Some(json::json!({
        "playerId": fx.player.id,
        "type": "CASH_OUT",
        "amount": 20,
        "notes": "table 3",
      })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], "CASH_OUT");
    assert_eq!(body["amount"], "20.00");
    assert_eq!(body["channel"], "CASH");
    assert_eq!(body["playerName"], "Pat Doyle");

    let (_, body) = call(&app, "GET", "/api/version", None, None).await;
    assert_eq!(body["version"], 1);
  }

  #[tokio::test]
  async fn opening_balances_are_admin_only() {
    let (app, fx) = app().await;
    let payload = json::json!({
      "date": "2024-01-01",
      "time": "08:00",
      "balances": [
        { "channel": "CASH", "amount": "500" },
        { "channel": fx.bank.id, "amount": 250 },
      ],
    });

    let (status, body) = call(
      &app,
      "PUT",
      "/api/opening-balances",
      Some(fx.cashier.id),
      Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = call(
      &app,
      "PUT",
      "/api/opening-balances",
      Some(fx.admin.id),
      Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
      &app,
      "GET",
      "/api/transactions/report?date=2024-01-01",
      Some(fx.cashier.id),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let channels = body["channels"].as_array().unwrap();
    assert_eq!(channels.len(), 3);
    assert_eq!(channels[0]["balance"], "500.00");
    assert_eq!(channels[1]["name"], "Main Bank");
    assert_eq!(channels[1]["opening"], "250.00");
    assert_eq!(channels[2]["channel"], "DEPOSITS");
  }

  #[tokio::test]
  async fn validation_errors_are_bad_requests() {
    let (app, fx) = app().await;

    let (status, body) = call(
      &app,
      "POST",
      "/api/transactions",
      Some(fx.cashier.id),
      Some(json::json!({
        "playerId": fx.player.id,
        "type": "BUY_IN",
        "amount": "10",
        "paymentMethod": "BANK",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BANK_ACCOUNT_REQUIRED");

    let (status, body) = call(
      &app,
      "GET",
      "/api/transactions?type=REFUND",
      Some(fx.cashier.id),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TYPE");

    let (status, body) =
      call(&app, "GET", "/api/players/999", Some(fx.cashier.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
  }

  #[tokio::test]
  async fn malformed_input_gets_an_error_body() {
    let (app, fx) = app().await;
    let post = |kind: json::Value, amount: json::Value| {
      json::json!({ "playerId": fx.player.id, "type": kind, "amount": amount })
    };

    let cases = [
      (post("BUY_IN".into(), "abc".into()), "INVALID_AMOUNT"),
      (post("BUY_IN".into(), true.into()), "INVALID_AMOUNT"),
      (post(7.into(), "10".into()), "INVALID_TYPE"),
      (post("REFUND".into(), true.into()), "INVALID_TYPE"),
      (json::json!({ "playerId": "one", "type": "BUY_IN" }), "INVALID_ARGS"),
    ];
    for (body, code) in cases {
      let (status, res) = call(
        &app,
        "POST",
        "/api/transactions",
        Some(fx.cashier.id),
        Some(body.clone()),
      )
      .await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
      assert_eq!(res["code"], code, "{body}");
    }

    let (status, res) = call(
      &app,
      "GET",
      "/api/transactions/report?date=yesterday",
      Some(fx.cashier.id),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["code"], "INVALID_ARGS");
  }

  #[tokio::test]
  async fn dealers_record_rake_and_admins_set_rakeback() {
    let (app, fx) = app().await;
    let dealer = test_db::add_staff(&app.db, "Dee", StaffRole::Dealer).await;

    let (status, _) = call(
      &app,
      "POST",
      "/api/rake",
      Some(dealer.id),
      Some(json::json!({
        "tableSessionId": 3,
        "potAmount": "200",
        "rakeAmount": "10",
        "playerId": fx.player.id,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/players/{}/rakeback", fx.player.id);
    let percent = json::json!({ "rakebackPercent": 30 });
    let (status, _) =
      call(&app, "PUT", &uri, Some(dealer.id), Some(percent.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) =
      call(&app, "PUT", &uri, Some(fx.admin.id), Some(percent)).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/rakeback?playerId={}", fx.player.id);
    let (status, body) = call(&app, "GET", &uri, Some(fx.cashier.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRakeContributed"], "10.00");
    assert_eq!(body["rakebackEarned"], "3.00");
    assert_eq!(body["rakebackBalance"], "3.00");

    let (_, body) =
      call(&app, "GET", "/api/rake?tableSessionId=3", Some(dealer.id), None)
        .await;
    assert_eq!(body["totalRake"], "10.00");
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
  }
}
