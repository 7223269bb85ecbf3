use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{bank_account, player, staff};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
  #[sea_orm(string_value = "BUY_IN")]
  BuyIn,
  #[sea_orm(string_value = "CASH_OUT")]
  CashOut,
  #[sea_orm(string_value = "DEPOSIT")]
  Deposit,
  #[sea_orm(string_value = "WITHDRAWAL")]
  Withdrawal,
  #[sea_orm(string_value = "RAKEBACK_PAYOUT")]
  RakebackPayout,
}

impl TransactionType {
  /// Only buy-ins and cash-outs move money through cash or a bank account.
  pub fn takes_payment_method(self) -> bool {
    matches!(self, Self::BuyIn | Self::CashOut)
  }

  /// Outgoing kinds must pass the solvency guard.
  pub fn is_outgoing(self) -> bool {
    matches!(self, Self::CashOut | Self::Withdrawal)
  }
}

impl FromStr for TransactionType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "BUY_IN" => Ok(Self::BuyIn),
      "CASH_OUT" => Ok(Self::CashOut),
      "DEPOSIT" => Ok(Self::Deposit),
      "WITHDRAWAL" => Ok(Self::Withdrawal),
      "RAKEBACK_PAYOUT" => Ok(Self::RakebackPayout),
      _ => Err(Error::InvalidType),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
  #[sea_orm(string_value = "CASH")]
  Cash,
  #[sea_orm(string_value = "BANK")]
  Bank,
}

impl FromStr for PaymentMethod {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "CASH" => Ok(Self::Cash),
      "BANK" => Ok(Self::Bank),
      other => {
        Err(Error::InvalidArgs(format!("Invalid payment method: {other}")))
      }
    }
  }
}

/// Append-only: rows are inserted by `sv::Ledger::record` and never updated.
/// `amount` is in cents.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub player_id: i32,
  pub tx_type: TransactionType,
  pub amount: i64,
  pub payment_method: Option<PaymentMethod>,
  pub bank_account_id: Option<i32>,
  pub notes: Option<String>,
  pub recorded_by: i32,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "player::Entity",
    from = "Column::PlayerId",
    to = "player::Column::Id"
  )]
  Player,
  #[sea_orm(
    belongs_to = "bank_account::Entity",
    from = "Column::BankAccountId",
    to = "bank_account::Column::Id"
  )]
  BankAccount,
  #[sea_orm(
    belongs_to = "staff::Entity",
    from = "Column::RecordedBy",
    to = "staff::Column::Id"
  )]
  Staff,
}

impl Related<player::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Player.def()
  }
}

impl Related<bank_account::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::BankAccount.def()
  }
}

impl Related<staff::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Staff.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
