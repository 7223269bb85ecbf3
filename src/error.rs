use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr, sqlx};
use serde::Serialize;

use crate::money::Money;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Db(#[source] DbErr),

  #[error("Invalid transaction type")]
  InvalidType,
  #[error("Amount must be positive")]
  InvalidAmount,
  #[error("Bank account is required for bank payments")]
  BankAccountRequired,
  #[error("Insufficient funds in {channel}. Available: {available}")]
  InsufficientFunds { channel: String, available: Money },

  #[error("Player not found")]
  PlayerNotFound,
  #[error("Bank account not found")]
  BankAccountNotFound,
  #[error("Bank account is inactive")]
  BankAccountInactive,
  #[error("Staff member not found")]
  StaffNotFound,

  #[error("Unauthorized")]
  Unauthorized,
  #[error("Forbidden")]
  Forbidden,

  #[error("An active bank account with this name already exists")]
  DuplicateName,
  #[error("Invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("Channel is busy, retry the request")]
  Conflict,
  #[error("Internal error: {0}")]
  Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// SQLite lock contention surfaces as a retryable conflict.
impl From<DbErr> for Error {
  fn from(err: DbErr) -> Self {
    if is_busy(&err) {
      tracing::warn!("Database is busy: {err}");
      Error::Conflict
    } else {
      Error::Db(err)
    }
  }
}

/// `SQLITE_BUSY` (5) and `SQLITE_LOCKED` (6), including extended codes.
fn is_busy(err: &DbErr) -> bool {
  let (DbErr::Conn(RuntimeErr::SqlxError(err))
  | DbErr::Exec(RuntimeErr::SqlxError(err))
  | DbErr::Query(RuntimeErr::SqlxError(err))) = err
  else {
    return false;
  };
  let sqlx::Error::Database(err) = err else {
    return false;
  };

  err
    .code()
    .and_then(|code| code.parse::<i32>().ok())
    .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

impl Error {
  /// Stable code clients can match on.
  pub fn code(&self) -> &'static str {
    match self {
      Error::Db(_) | Error::Internal(_) => "INTERNAL",
      Error::InvalidType => "INVALID_TYPE",
      Error::InvalidAmount => "INVALID_AMOUNT",
      Error::BankAccountRequired => "BANK_ACCOUNT_REQUIRED",
      Error::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
      Error::PlayerNotFound
      | Error::BankAccountNotFound
      | Error::StaffNotFound => "NOT_FOUND",
      Error::BankAccountInactive => "BANK_ACCOUNT_INACTIVE",
      Error::Unauthorized => "UNAUTHORIZED",
      Error::Forbidden => "FORBIDDEN",
      Error::DuplicateName => "DUPLICATE_NAME",
      Error::InvalidArgs(_) => "INVALID_ARGS",
      Error::Conflict => "CONFLICT",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::Db(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::InvalidType
      | Error::InvalidAmount
      | Error::BankAccountRequired
      | Error::BankAccountInactive
      | Error::InvalidArgs(_) => StatusCode::BAD_REQUEST,
      Error::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      Error::PlayerNotFound
      | Error::BankAccountNotFound
      | Error::StaffNotFound => StatusCode::NOT_FOUND,
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::DuplicateName | Error::Conflict => StatusCode::CONFLICT,
    }
  }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self {
    Error::InvalidArgs(rejection.body_text())
  }
}

impl From<QueryRejection> for Error {
  fn from(rejection: QueryRejection) -> Self {
    Error::InvalidArgs(rejection.body_text())
  }
}

#[derive(Serialize)]
struct Body {
  error: String,
  code: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  available: Option<Money>,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!("{self}");
    }

    let available = match &self {
      Error::InsufficientFunds { available, .. } => Some(*available),
      _ => None,
    };
    let body = Body {
      // don't leak storage details to clients
      error: if status.is_server_error() {
        "Internal server error".into()
      } else {
        self.to_string()
      },
      code: self.code(),
      available,
    };

    (status, Json(body)).into_response()
  }
}
