use std::io::{BufRead, BufReader, Read, Write};

use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use thiserror::Error;

use crate::account::{Account, AccountSummary};
use crate::command::{Command, ParseError};
use crate::ledger::{Ledger, LedgerError};

type Result<T> = std::result::Result<T, BatchError>;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Input is empty, expected an operation count header")]
    MissingHeader,
    #[error("Operation count header {0:?} is malformed, expected key=N")]
    MalformedHeader(String),
    #[error("Input ended after {read} of {expected} commands")]
    Truncated { expected: usize, read: usize },
    #[error("Command {index} is malformed: {source}")]
    Command {
        index: usize,
        #[source]
        source: ParseError,
    },
    #[error("Failed to read command: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to export accounts: {0}")]
    Export(#[source] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parse the `key=N` line announcing how many commands follow.
fn parse_header(line: &str) -> Result<usize> {
    let line = line.trim_end();
    line.split('=')
        .nth(1)
        .and_then(|count| count.trim().parse().ok())
        .ok_or_else(|| BatchError::MalformedHeader(line.to_string()))
}

// Status line printed when a ledger operation is rejected
fn status_line(err: &LedgerError) -> &'static str {
    match err {
        LedgerError::AccountNotFound(_) => "ACCOUNT NOT FOUND",
        LedgerError::AccountAlreadyExists(_) => "ACCOUNT ALREADY EXISTS",
        LedgerError::InvalidAmount(_) => "INVALID AMOUNT",
        LedgerError::InsufficientFunds { .. } => "INSUFFICIENT FUNDS",
    }
}

/// Runs a counted batch of comma-separated commands against one ledger.
#[derive(Debug, Default)]
pub struct BatchRunner {
    ledger: Ledger,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Process the header and the announced number of commands from `input`,
    /// writing summaries and status lines to `out`.
    pub fn run<R: Read, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        let mut input = BufReader::new(input);

        let mut header = String::new();
        if input.read_line(&mut header)? == 0 {
            return Err(BatchError::MissingHeader);
        }
        let expected = parse_header(&header)?;
        // The line after the count is a separator and carries no command
        input.read_line(&mut String::new())?;
        debug!("Expecting {} commands", expected);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        let mut read = 0;
        for record in reader.records().take(expected) {
            let record = record?;
            read += 1;
            match Command::parse(&record) {
                Ok(command) => self.execute(command, out)?,
                Err(err) if err.is_fatal() => {
                    return Err(BatchError::Command {
                        index: read,
                        source: err,
                    })
                }
                Err(err) => {
                    warn!("Skipping command {}: {}", read, err);
                    writeln!(out, "UNKNOWN ACTION: {}", record.get(0).unwrap_or_default())?;
                }
            }
        }

        if read < expected {
            return Err(BatchError::Truncated { expected, read });
        }
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        debug!("Executing {:?}", command);
        let outcome = match command {
            Command::CreateAccount {
                id,
                holder_name,
                initial_balance,
            } => {
                if self
                    .ledger
                    .upsert(Account::new(id, holder_name, initial_balance))
                    .is_some()
                {
                    debug!("Account (id: {}) was replaced", id);
                }
                Ok(())
            }
            Command::DeleteAccount { id } => match self.ledger.delete(id) {
                Ok(_) => {
                    writeln!(out, "ACCOUNT DELETED")?;
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Command::Deposit { id, amount } => self.ledger.deposit(id, amount).map(|_| ()),
            Command::Withdraw { id, amount } => self.ledger.withdraw(id, amount).map(|_| ()),
            Command::UpdateAccountName { id, holder_name } => self.ledger.rename(id, holder_name),
            Command::PrintAccountSummary { id } => match self.ledger.find(id) {
                Ok(account) => {
                    writeln!(out, "{}", AccountSummary::from(account))?;
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Command::PrintAllAccountsSummary => {
                for account in self.ledger.accounts() {
                    writeln!(out, "{}", AccountSummary::from(account))?;
                }
                Ok(())
            }
            Command::PrintAllAccountSummariesByHolderName { holder_name } => {
                if let Some(holder_name) = holder_name {
                    for account in self.ledger.by_holder_name(&holder_name) {
                        writeln!(out, "{}", AccountSummary::from(account))?;
                    }
                }
                Ok(())
            }
        };

        if let Err(err) = outcome {
            warn!("Command rejected: {}", err);
            writeln!(out, "{}", status_line(&err))?;
        }
        Ok(())
    }

    /// Serialize the accounts to `writer` as CSV, in insertion order
    pub fn export_accounts<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for account in self.ledger.accounts() {
            writer
                .serialize(AccountSummary::from(account))
                .map_err(BatchError::Export)?;
        }
        writer.flush()?;
        Ok(())
    }
}
