pub mod account;
pub mod batch;
pub mod command;
pub mod interactive;
pub mod ledger;

pub use account::{Account, AccountId};
pub use ledger::{Ledger, LedgerError};
