//! End-of-day reconciliation.
//!
//! Channel balances are computed with the same day bounds and the same
//! [`channel::tally`] the solvency guard uses, so a report's closing balance
//! equals what the guard would have allowed at the end of that day.

use serde::Serialize;

use crate::{
  entity::{PaymentMethod, TransactionType, bank_account, transaction},
  prelude::*,
  sv::{
    channel::{self, Channel, Flow},
    ledger::{self, TransactionView},
    opening, rake, solvency, tips,
  },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub total_buy_ins: Money,
  pub total_buy_ins_cash: Money,
  pub total_buy_ins_bank: Money,
  pub total_cash_outs: Money,
  pub total_deposits: Money,
  pub total_withdrawals: Money,
  pub total_rakeback_payouts: Money,
  pub transaction_count: usize,
  pub total_rake: Money,
  pub total_tips_collected: Money,
}

impl Summary {
  fn add(&mut self, tx: &transaction::Model) -> Result<()> {
    let amount = Money(tx.amount);
    self.transaction_count += 1;

    match tx.tx_type {
      TransactionType::BuyIn => {
        grow(&mut self.total_buy_ins, amount)?;
        match tx.payment_method {
          Some(PaymentMethod::Bank) => grow(&mut self.total_buy_ins_bank, amount),
          _ => grow(&mut self.total_buy_ins_cash, amount),
        }
      }
      TransactionType::CashOut => grow(&mut self.total_cash_outs, amount),
      TransactionType::Deposit => grow(&mut self.total_deposits, amount),
      TransactionType::Withdrawal => grow(&mut self.total_withdrawals, amount),
      TransactionType::RakebackPayout => {
        grow(&mut self.total_rakeback_payouts, amount)
      }
    }
  }
}

fn grow(total: &mut Money, amount: Money) -> Result<()> {
  *total = total.checked_add(amount).ok_or(Error::InvalidAmount)?;
  Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReport {
  pub channel: Channel,
  pub name: String,
  pub opening: Money,
  #[serde(rename = "in")]
  pub inflow: Money,
  #[serde(rename = "out")]
  pub outflow: Money,
  pub net: Money,
  pub balance: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
  pub date: Date,
  pub summary: Summary,
  pub channels: Vec<ChannelReport>,
  pub transactions: Vec<TransactionView>,
}

pub struct Report<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Report<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn build(&self, date: Date) -> Result<DailyReport> {
    let txs = solvency::transactions_on(self.db, date).await?;
    let openings = opening::openings_on(self.db, date).await?;

    let mut summary = Summary::default();
    for tx in &txs {
      summary.add(tx)?;
    }
    summary.total_rake = rake::total_on(self.db, date).await?;
    summary.total_tips_collected = tips::total_on(self.db, date).await?;

    let mut flows = channel::tally(&txs)?;
    let mut keys: BTreeSet<Channel> =
      flows.keys().chain(openings.keys()).copied().collect();
    keys.insert(Channel::Cash);
    keys.insert(Channel::Deposits);

    let bank_ids: Vec<i32> = keys
      .iter()
      .filter_map(|channel| match channel {
        Channel::Bank(id) => Some(*id),
        _ => None,
      })
      .collect();
    let banks: HashMap<i32, bank_account::Model> = bank_account::Entity::find()
      .filter(bank_account::Column::Id.is_in(bank_ids))
      .all(self.db)
      .await?
      .into_iter()
      .map(|bank| (bank.id, bank))
      .collect();

    let channels: Vec<ChannelReport> = keys
      .into_iter()
      .map(|channel| -> Result<ChannelReport> {
        let opening = openings.get(&channel).copied().unwrap_or_default();
        let flow = flows.remove(&channel).unwrap_or_default();
        let Flow { inflow, outflow } = flow;
        let bank = match channel {
          Channel::Bank(id) => banks.get(&id),
          _ => None,
        };

        Ok(ChannelReport {
          channel,
          name: channel.display_name(bank),
          opening,
          inflow,
          outflow,
          net: flow.net(),
          balance: opening
            .checked_add(flow.net())
            .ok_or(Error::InvalidAmount)?,
        })
      })
      .collect::<Result<_>>()?;

    debug!(
      "Report for {}: {} transactions, {} channels",
      date,
      summary.transaction_count,
      channels.len()
    );

    Ok(DailyReport {
      date,
      summary,
      channels,
      transactions: ledger::enrich(self.db, txs).await?,
    })
  }
}
