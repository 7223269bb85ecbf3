pub mod bank;
pub mod channel;
pub mod ledger;
pub mod opening;
pub mod player;
pub mod rake;
pub mod rakeback;
pub mod report;
pub mod solvency;
pub mod staff;
#[cfg(test)]
pub mod test_utils;
pub mod tips;

pub use bank::BankAccounts;
pub use channel::Channel;
pub use ledger::Ledger;
pub use opening::Openings;
pub use player::Players;
pub use rake::Rake;
pub use rakeback::Rakeback;
pub use report::Report;
pub use solvency::ChannelLocks;
pub use staff::Staff;
pub use tips::Tips;

/// Borrowed services for one request.
pub struct Services<'a> {
  pub ledger: Ledger<'a>,
  pub openings: Openings<'a>,
  pub report: Report<'a>,
  pub rake: Rake<'a>,
  pub rakeback: Rakeback<'a>,
  pub tips: Tips<'a>,
  pub banks: BankAccounts<'a>,
  pub players: Players<'a>,
  pub staff: Staff<'a>,
}
