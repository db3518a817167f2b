use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::{debug, warn};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::{Account, AccountId, BalanceReport};
use crate::command::parse_amount;
use crate::ledger::{Ledger, LedgerError};

const MENU: &str = "\n1. Create Account\n2. Deposit\n3. Withdraw\n4. Check Balance\n5. Exit\n";

#[derive(Debug, Error, PartialEq)]
#[error("Invalid menu choice {0:?}")]
pub struct InvalidChoice(String);

#[derive(Debug, Clone, Copy, PartialEq)]
enum MenuChoice {
    CreateAccount,
    Deposit,
    Withdraw,
    CheckBalance,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuChoice::CreateAccount),
            "2" => Ok(MenuChoice::Deposit),
            "3" => Ok(MenuChoice::Withdraw),
            "4" => Ok(MenuChoice::CheckBalance),
            "5" => Ok(MenuChoice::Exit),
            other => Err(InvalidChoice(other.to_string())),
        }
    }
}

fn message(err: &LedgerError) -> &'static str {
    match err {
        LedgerError::AccountNotFound(_) => "Account not found.",
        LedgerError::AccountAlreadyExists(_) => "Account already exists.",
        LedgerError::InvalidAmount(_) => "Invalid amount.",
        LedgerError::InsufficientFunds { .. } => "Insufficient funds.",
    }
}

/// Menu-driven session over a line-oriented terminal.
///
/// Runs until the exit option is chosen or the input is exhausted.
pub struct Session<R, W> {
    input: R,
    out: W,
    ledger: Ledger,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            ledger: Ledger::new(),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            write!(self.out, "{}", MENU)?;
            let Some(line) = self.prompt("Enter your choice: ")? else {
                debug!("Input exhausted, leaving the menu");
                return Ok(());
            };

            let choice = match line.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(err) => {
                    debug!("{}", err);
                    writeln!(self.out, "Invalid choice. Please try again.")?;
                    continue;
                }
            };

            let finished = match choice {
                MenuChoice::CreateAccount => self.create_account()?,
                MenuChoice::Deposit => self.deposit()?,
                MenuChoice::Withdraw => self.withdraw()?,
                MenuChoice::CheckBalance => self.check_balance()?,
                MenuChoice::Exit => {
                    writeln!(self.out, "Goodbye!")?;
                    return Ok(());
                }
            };
            // A prompt hit the end of the input
            if finished.is_none() {
                return Ok(());
            }
        }
    }

    // Each handler returns None when the input ran out mid-prompt.

    fn create_account(&mut self) -> io::Result<Option<()>> {
        let Some(id) = self.prompt_account_id()? else {
            return Ok(None);
        };
        let Some(holder_name) = self.prompt("Enter holder name: ")? else {
            return Ok(None);
        };
        let Some(balance) = self.prompt_amount("Enter initial balance: ")? else {
            return Ok(None);
        };

        match self.ledger.create(Account::new(id, holder_name, balance)) {
            Ok(_) => writeln!(self.out, "Account created successfully.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Some(()))
    }

    fn deposit(&mut self) -> io::Result<Option<()>> {
        let Some(id) = self.prompt_account_id()? else {
            return Ok(None);
        };
        let Some(amount) = self.prompt_amount("Enter amount to deposit: ")? else {
            return Ok(None);
        };

        match self.ledger.deposit(id, amount) {
            Ok(_) => writeln!(self.out, "Deposit successful.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Some(()))
    }

    fn withdraw(&mut self) -> io::Result<Option<()>> {
        let Some(id) = self.prompt_account_id()? else {
            return Ok(None);
        };
        let Some(amount) = self.prompt_amount("Enter amount to withdraw: ")? else {
            return Ok(None);
        };

        match self.ledger.withdraw(id, amount) {
            Ok(_) => writeln!(self.out, "Withdrawal successful.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Some(()))
    }

    fn check_balance(&mut self) -> io::Result<Option<()>> {
        let Some(id) = self.prompt_account_id()? else {
            return Ok(None);
        };

        match self.ledger.find(id) {
            Ok(account) => writeln!(self.out, "{}", BalanceReport(account))?,
            Err(err) => self.report(&err)?,
        }
        Ok(Some(()))
    }

    fn report(&mut self, err: &LedgerError) -> io::Result<()> {
        warn!("Operation rejected: {}", err);
        writeln!(self.out, "{}", message(err))
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Re-prompts until the line parses.
    fn prompt_number<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> io::Result<Option<T>> {
        while let Some(line) = self.prompt(label)? {
            match parse(&line) {
                Some(value) => return Ok(Some(value)),
                None => writeln!(self.out, "Invalid number. Please try again.")?,
            }
        }
        Ok(None)
    }

    fn prompt_account_id(&mut self) -> io::Result<Option<AccountId>> {
        self.prompt_number("Enter account number: ", |line| line.parse().ok())
    }

    fn prompt_amount(&mut self, label: &str) -> io::Result<Option<Decimal>> {
        self.prompt_number(label, parse_amount)
    }
}
