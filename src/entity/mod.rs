pub mod bank_account;
pub mod opening_balance;
pub mod player;
pub mod rake_record;
pub mod staff;
pub mod tip_collection;
pub mod transaction;

pub use staff::StaffRole;
pub use transaction::{PaymentMethod, TransactionType};
