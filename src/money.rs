//! Amounts are stored as integer cents. `Money` converts to and from
//! `Decimal` at the API edge.

use std::{
  fmt,
  iter::Sum,
  ops::{Add, Sub},
};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Serialize, Serializer};

pub const CENTS: i64 = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(pub i64);

impl Money {
  pub const ZERO: Money = Money(0);
  /// Largest amount a single request may carry, $10,000,000,000.00.
  pub const MAX: Money = Money(1_000_000_000_000);

  pub fn cents(self) -> i64 {
    self.0
  }

  /// Rejects amounts with sub-cent precision instead of rounding them away,
  /// and anything beyond [`Money::MAX`] in either direction.
  pub fn from_decimal(amount: Decimal) -> Option<Money> {
    let amount = amount.normalize();
    if amount.scale() > 2 {
      return None;
    }
    amount
      .checked_mul(Decimal::from(CENTS))?
      .to_i64()
      .map(Money)
      .filter(|money| money.0.unsigned_abs() <= Self::MAX.0 as u64)
  }

  pub fn to_decimal(self) -> Decimal {
    Decimal::new(self.0, 2)
  }

  pub fn checked_add(self, rhs: Money) -> Option<Money> {
    self.0.checked_add(rhs.0).map(Money)
  }

  pub fn checked_sub(self, rhs: Money) -> Option<Money> {
    self.0.checked_sub(rhs.0).map(Money)
  }

  pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
    amounts.into_iter().try_fold(Money::ZERO, Money::checked_add)
  }

  pub fn is_positive(self) -> bool {
    self.0 > 0
  }

  pub fn is_negative(self) -> bool {
    self.0 < 0
  }
}

impl fmt::Display for Money {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.0 < 0 { "-" } else { "" };
    let abs = self.0.unsigned_abs();
    write!(f, "{sign}${}.{:02}", abs / CENTS as u64, abs % CENTS as u64)
  }
}

impl Serialize for Money {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    Serialize::serialize(&self.to_decimal(), s)
  }
}

impl Add for Money {
  type Output = Money;

  fn add(self, rhs: Money) -> Money {
    Money(self.0 + rhs.0)
  }
}

impl Sub for Money {
  type Output = Money;

  fn sub(self, rhs: Money) -> Money {
    Money(self.0 - rhs.0)
  }
}

impl Sum for Money {
  fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
    iter.fold(Money::ZERO, Add::add)
  }
}
