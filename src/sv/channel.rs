//! Channel resolution and per-channel flow tallies.
//!
//! Both the solvency guard and the daily report classify transactions through
//! [`Channel::resolve`] and [`tally`], which is what keeps a live balance check
//! and an end-of-day report in agreement.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
  entity::{PaymentMethod, TransactionType, bank_account, transaction},
  prelude::*,
};

/// A money pool whose balance is tracked independently.
///
/// Variant order is the report order: cash first, bank accounts by id,
/// deposits last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
  Cash,
  Bank(i32),
  Deposits,
}

impl Channel {
  /// Maps a transaction onto the channel its money moves through.
  ///
  /// Rakeback payouts come out of club funds that are not tracked per channel
  /// and resolve to `None`.
  pub fn resolve(
    tx_type: TransactionType,
    payment_method: Option<PaymentMethod>,
    bank_account_id: Option<i32>,
  ) -> Option<Channel> {
    match tx_type {
      TransactionType::Deposit | TransactionType::Withdrawal => {
        Some(Channel::Deposits)
      }
      TransactionType::BuyIn | TransactionType::CashOut => {
        match (payment_method, bank_account_id) {
          (Some(PaymentMethod::Bank), Some(id)) => Some(Channel::Bank(id)),
          _ => Some(Channel::Cash),
        }
      }
      TransactionType::RakebackPayout => None,
    }
  }

  pub fn of(tx: &transaction::Model) -> Option<Channel> {
    Self::resolve(tx.tx_type, tx.payment_method, tx.bank_account_id)
  }

  /// Storage key used by opening balances.
  pub fn key(&self) -> String {
    self.to_string()
  }

  /// Human-readable name; bank channels need the account row.
  pub fn display_name(&self, bank: Option<&bank_account::Model>) -> String {
    match (self, bank) {
      (Channel::Cash, _) => "Cash".into(),
      (Channel::Deposits, _) => "Deposits".into(),
      (Channel::Bank(_), Some(account)) => account.name.clone(),
      (Channel::Bank(id), None) => format!("Bank account #{id}"),
    }
  }

  /// Like [`Channel::display_name`] but looks the bank account up.
  pub async fn name<C: ConnectionTrait>(&self, conn: &C) -> Result<String> {
    let bank = match self {
      Channel::Bank(id) => bank_account::Entity::find_by_id(*id).one(conn).await?,
      _ => None,
    };
    Ok(self.display_name(bank.as_ref()))
  }
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Channel::Cash => f.write_str("CASH"),
      Channel::Deposits => f.write_str("DEPOSITS"),
      Channel::Bank(id) => write!(f, "{id}"),
    }
  }
}

impl FromStr for Channel {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "CASH" => Ok(Channel::Cash),
      "DEPOSITS" => Ok(Channel::Deposits),
      other => other
        .parse()
        .map(Channel::Bank)
        .map_err(|_| Error::InvalidArgs(format!("Unknown channel: {other}"))),
    }
  }
}

impl Serialize for Channel {
  fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Channel {
  fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
    struct Visitor;

    impl de::Visitor<'_> for Visitor {
      type Value = Channel;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\"CASH\", \"DEPOSITS\" or a bank account id")
      }

      fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Channel, E> {
        v.parse().map_err(E::custom)
      }

      fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Channel, E> {
        i32::try_from(v).map(Channel::Bank).map_err(E::custom)
      }

      fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Channel, E> {
        i32::try_from(v).map(Channel::Bank).map_err(E::custom)
      }
    }

    d.deserialize_any(Visitor)
  }
}

/// Inflow and outflow of one channel over some set of transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flow {
  pub inflow: Money,
  pub outflow: Money,
}

impl Flow {
  /// Both sides are sums of positive amounts, so this cannot overflow.
  pub fn net(&self) -> Money {
    self.inflow - self.outflow
  }

  fn apply(&mut self, tx: &transaction::Model) -> Result<()> {
    let side = match tx.tx_type {
      TransactionType::BuyIn | TransactionType::Deposit => &mut self.inflow,
      TransactionType::CashOut | TransactionType::Withdrawal => {
        &mut self.outflow
      }
      TransactionType::RakebackPayout => return Ok(()),
    };
    *side = side.checked_add(Money(tx.amount)).ok_or_else(|| {
      warn!("Flow overflow at transaction #{}", tx.id);
      Error::InvalidAmount
    })?;
    Ok(())
  }
}

/// Sums flows per channel. Order-independent.
pub fn tally<'a>(
  txs: impl IntoIterator<Item = &'a transaction::Model>,
) -> Result<BTreeMap<Channel, Flow>> {
  let mut flows = BTreeMap::<Channel, Flow>::new();
  for tx in txs {
    if let Some(channel) = Channel::of(tx) {
      flows.entry(channel).or_default().apply(tx)?;
    }
  }
  Ok(flows)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tx(
    tx_type: TransactionType,
    amount: i64,
    payment_method: Option<PaymentMethod>,
    bank_account_id: Option<i32>,
  ) -> transaction::Model {
    transaction::Model {
      id: 0,
      player_id: 1,
      tx_type,
      amount,
      payment_method,
      bank_account_id,
      notes: None,
      recorded_by: 1,
      created_at: Utc::now().naive_utc(),
    }
  }

  #[test]
  fn every_combination_resolves() {
    use PaymentMethod::*;
    use TransactionType::*;

    let methods = [None, Some(Cash), Some(Bank)];
    let banks = [None, Some(7)];

    for ty in [BuyIn, CashOut, Deposit, Withdrawal, RakebackPayout] {
      for method in methods {
        for bank in banks {
          let channel = Channel::resolve(ty, method, bank);
          let expected = match (ty, method, bank) {
            (Deposit | Withdrawal, _, _) => Some(Channel::Deposits),
            (RakebackPayout, _, _) => None,
            (_, Some(Bank), Some(id)) => Some(Channel::Bank(id)),
            _ => Some(Channel::Cash),
          };
          assert_eq!(channel, expected, "{ty:?} {method:?} {bank:?}");
        }
      }
    }
  }

  #[test]
  fn keys_round_trip() {
    for channel in [Channel::Cash, Channel::Deposits, Channel::Bank(42)] {
      assert_eq!(channel.key().parse::<Channel>().unwrap(), channel);
    }
    assert!("PETTY_CASH".parse::<Channel>().is_err());
  }

  #[test]
  fn deserializes_from_string_or_number() {
    let channels: Vec<Channel> =
      json::from_str(r#"["CASH", "DEPOSITS", "3", 4]"#).unwrap();
    assert_eq!(
      channels,
      vec![Channel::Cash, Channel::Deposits, Channel::Bank(3), Channel::Bank(4)]
    );
  }

  #[test]
  fn report_order_is_cash_banks_deposits() {
    let mut channels =
      vec![Channel::Deposits, Channel::Bank(2), Channel::Cash, Channel::Bank(1)];
    channels.sort();
    assert_eq!(
      channels,
      vec![Channel::Cash, Channel::Bank(1), Channel::Bank(2), Channel::Deposits]
    );
  }

  #[test]
  fn tally_splits_by_channel() {
    use PaymentMethod::*;
    use TransactionType::*;

    let txs = vec![
      tx(BuyIn, 20000, Some(Cash), None),
      tx(CashOut, 65000, None, None),
      tx(BuyIn, 5000, Some(Bank), Some(3)),
      tx(Deposit, 1000, None, None),
      tx(Withdrawal, 400, None, None),
      tx(RakebackPayout, 999, None, None),
    ];

    let flows = tally(&txs).unwrap();

    assert_eq!(flows.len(), 3);
    assert_eq!(flows[&Channel::Cash].net(), Money(-45000));
    assert_eq!(
      flows[&Channel::Bank(3)],
      Flow { inflow: Money(5000), outflow: Money::ZERO }
    );
    assert_eq!(flows[&Channel::Deposits].net(), Money(600));
  }

  #[test]
  fn tally_overflow_is_an_error() {
    use TransactionType::*;

    let half = i64::MAX / 2 + 1;
    let txs = vec![tx(BuyIn, half, None, None), tx(BuyIn, half, None, None)];
    assert!(matches!(tally(&txs), Err(Error::InvalidAmount)));

    // other channels are unaffected by one channel's volume
    let txs = vec![tx(BuyIn, half, None, None), tx(Deposit, half, None, None)];
    assert_eq!(tally(&txs).unwrap().len(), 2);
  }
}
