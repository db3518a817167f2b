use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::{Account, AccountId};

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Account (id: {0}) does not exist")]
    AccountNotFound(AccountId),
    #[error("Account (id: {0}) already exists")]
    AccountAlreadyExists(AccountId),
    #[error("Amount {0} is not valid for this operation")]
    InvalidAmount(Decimal),
    #[error("Account (id: {id}) has a balance of {balance}, cannot withdraw {requested}")]
    InsufficientFunds {
        id: AccountId,
        balance: Decimal,
        requested: Decimal,
    },
}

/// In-memory account store for a single run.
///
/// Lookups go through the keyed map; `order` remembers insertion order so
/// summaries list accounts the way they were opened.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: HashMap<AccountId, Account>,
    order: Vec<AccountId>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Open a new account, refusing ids that are already taken.
    pub fn create(&mut self, account: Account) -> Result<&Account> {
        if account.balance < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(account.balance));
        }
        if self.accounts.contains_key(&account.id) {
            return Err(LedgerError::AccountAlreadyExists(account.id));
        }
        Ok(self.push(account))
    }

    /// Open an account, replacing any record with the same id.
    ///
    /// A replaced record keeps its place in insertion order. Returns the
    /// previous record, if there was one.
    pub fn upsert(&mut self, account: Account) -> Option<Account> {
        match self.accounts.get_mut(&account.id) {
            Some(existing) => Some(std::mem::replace(existing, account)),
            None => {
                self.push(account);
                None
            }
        }
    }

    fn push(&mut self, account: Account) -> &Account {
        let id = account.id;
        self.order.push(id);
        self.accounts.entry(id).or_insert(account)
    }

    pub fn find(&self, id: AccountId) -> Result<&Account> {
        self.accounts.get(&id).ok_or(LedgerError::AccountNotFound(id))
    }

    fn find_mut(&mut self, id: AccountId) -> Result<&mut Account> {
        self.accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))
    }

    pub fn rename(&mut self, id: AccountId, holder_name: impl Into<String>) -> Result<()> {
        self.find_mut(id)?.holder_name = holder_name.into();
        Ok(())
    }

    pub fn delete(&mut self, id: AccountId) -> Result<Account> {
        let account = self
            .accounts
            .remove(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        self.order.retain(|&other| other != id);
        Ok(account)
    }

    /// Returns the new balance.
    pub fn deposit(&mut self, id: AccountId, amount: Decimal) -> Result<Decimal> {
        let account = self.find_mut(id)?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount(amount))?;
        Ok(account.balance)
    }

    /// Returns the new balance.
    pub fn withdraw(&mut self, id: AccountId, amount: Decimal) -> Result<Decimal> {
        let account = self.find_mut(id)?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if account.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                id,
                balance: account.balance,
                requested: amount,
            });
        }
        account.balance = account
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::InvalidAmount(amount))?;
        Ok(account.balance)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.order.iter().filter_map(|id| self.accounts.get(id))
    }

    /// Accounts whose holder name equals `holder_name` exactly.
    pub fn by_holder_name<'a>(&'a self, holder_name: &'a str) -> impl Iterator<Item = &'a Account> {
        self.accounts()
            .filter(move |account| account.holder_name == holder_name)
    }
}
