use std::str::FromStr;

use csv::StringRecord;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::AccountId;

type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Action {action} is missing its {name} argument")]
    MissingArgument { action: String, name: &'static str },
    #[error("Could not parse {name} from {value:?}")]
    UnparseableNumber { name: &'static str, value: String },
}

impl ParseError {
    /// Unknown actions are skipped, any other malformed command ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::UnknownAction(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateAccount {
        id: AccountId,
        holder_name: String,
        initial_balance: Decimal,
    },
    DeleteAccount {
        id: AccountId,
    },
    Deposit {
        id: AccountId,
        amount: Decimal,
    },
    Withdraw {
        id: AccountId,
        amount: Decimal,
    },
    UpdateAccountName {
        id: AccountId,
        holder_name: String,
    },
    PrintAccountSummary {
        id: AccountId,
    },
    PrintAllAccountsSummary,
    /// A missing holder name matches no account.
    PrintAllAccountSummariesByHolderName {
        holder_name: Option<String>,
    },
}

impl Command {
    /// Parse a record of the form `action,arg1,arg2,arg3`.
    ///
    /// Arguments past the ones an action takes are ignored.
    pub fn parse(record: &StringRecord) -> Result<Self> {
        let args = Args {
            record,
            action: record.get(0).unwrap_or_default(),
        };

        let command = match args.action {
            "createAccount" => Command::CreateAccount {
                id: args.id(1)?,
                holder_name: args.text(2, "holder name")?,
                initial_balance: args.amount(3, "initial balance")?,
            },
            "deleteAccount" => Command::DeleteAccount { id: args.id(1)? },
            "deposit" => Command::Deposit {
                id: args.id(1)?,
                amount: args.amount(2, "amount")?,
            },
            "withdraw" => Command::Withdraw {
                id: args.id(1)?,
                amount: args.amount(2, "amount")?,
            },
            "updateAccountName" => Command::UpdateAccountName {
                id: args.id(1)?,
                holder_name: args.text(2, "holder name")?,
            },
            "printAccountSummary" => Command::PrintAccountSummary { id: args.id(1)? },
            "printAllAccountsSummary" => Command::PrintAllAccountsSummary,
            "printAllAccountSummariesByHolderName" => {
                Command::PrintAllAccountSummariesByHolderName {
                    holder_name: args.text(1, "holder name").ok(),
                }
            }
            other => return Err(ParseError::UnknownAction(other.to_string())),
        };
        Ok(command)
    }
}

// Positional argument access for a single record
struct Args<'a> {
    record: &'a StringRecord,
    action: &'a str,
}

impl Args<'_> {
    fn text(&self, index: usize, name: &'static str) -> Result<String> {
        self.record
            .get(index)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| ParseError::MissingArgument {
                action: self.action.to_string(),
                name,
            })
    }

    fn id(&self, index: usize) -> Result<AccountId> {
        let value = self.text(index, "account number")?;
        value.parse().map_err(|_| ParseError::UnparseableNumber {
            name: "account number",
            value,
        })
    }

    fn amount(&self, index: usize, name: &'static str) -> Result<Decimal> {
        let value = self.text(index, name)?;
        parse_amount(&value).ok_or(ParseError::UnparseableNumber { name, value })
    }
}

/// Accepts plain (`12.50`) and scientific (`1.25e1`) notation.
///
/// Magnitudes below the smallest representable step (`1e-28`) round to zero;
/// values beyond `Decimal::MAX`, NaN and infinities are rejected.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if let Ok(amount) = Decimal::from_str(value).or_else(|_| Decimal::from_scientific(value)) {
        return Some(amount);
    }

    let amount = value.parse::<f64>().ok().filter(|amount| amount.is_finite())?;
    if amount.abs() < 1e-28 {
        return Some(Decimal::ZERO);
    }
    Decimal::from_f64(amount)
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn parse(fields: &[&str]) -> Result<Command> {
        Command::parse(&StringRecord::from(fields.to_vec()))
    }

    #[test]
    fn test_parse_create_account() {
        assert_eq!(
            parse(&["createAccount", "100", "Alice", "50.00"]),
            Ok(Command::CreateAccount {
                id: 100,
                holder_name: "Alice".to_string(),
                initial_balance: dec!(50.00),
            })
        );
    }

    #[test]
    fn test_parse_every_action() {
        assert_eq!(
            parse(&["deleteAccount", "1"]),
            Ok(Command::DeleteAccount { id: 1 })
        );
        assert_eq!(
            parse(&["deposit", "1", "2.5"]),
            Ok(Command::Deposit {
                id: 1,
                amount: dec!(2.5)
            })
        );
        assert_eq!(
            parse(&["withdraw", "1", "1e1"]),
            Ok(Command::Withdraw {
                id: 1,
                amount: dec!(10)
            })
        );
        assert_eq!(
            parse(&["updateAccountName", "1", "Bob"]),
            Ok(Command::UpdateAccountName {
                id: 1,
                holder_name: "Bob".to_string()
            })
        );
        assert_eq!(
            parse(&["printAccountSummary", "1"]),
            Ok(Command::PrintAccountSummary { id: 1 })
        );
        assert_eq!(
            parse(&["printAllAccountsSummary"]),
            Ok(Command::PrintAllAccountsSummary)
        );
        assert_eq!(
            parse(&["printAllAccountSummariesByHolderName", "Bob"]),
            Ok(Command::PrintAllAccountSummariesByHolderName {
                holder_name: Some("Bob".to_string())
            })
        );
    }

    #[test]
    fn test_holder_name_filter_without_name() {
        assert_eq!(
            parse(&["printAllAccountSummariesByHolderName"]),
            Ok(Command::PrintAllAccountSummariesByHolderName { holder_name: None })
        );
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        assert_eq!(
            parse(&["deleteAccount", "1", "extra", "more"]),
            Ok(Command::DeleteAccount { id: 1 })
        );
    }

    #[test]
    fn test_unknown_action() {
        let err = parse(&["transfer", "1", "2"]).unwrap_err();
        assert_eq!(err, ParseError::UnknownAction("transfer".to_string()));
        assert!(!err.is_fatal());

        // Action names are case-sensitive
        assert_eq!(
            parse(&["Deposit", "1", "2"]),
            Err(ParseError::UnknownAction("Deposit".to_string()))
        );
    }

    #[test]
    fn test_missing_argument() {
        let err = parse(&["deposit", "1"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingArgument {
                action: "deposit".to_string(),
                name: "amount"
            }
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unparseable_numbers() {
        let err = parse(&["printAccountSummary", "abc"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnparseableNumber {
                name: "account number",
                value: "abc".to_string()
            }
        );
        assert!(err.is_fatal());

        assert_eq!(
            parse(&["deposit", "-4", "1.00"]),
            Ok(Command::Deposit {
                id: -4,
                amount: dec!(1.00)
            })
        );
        assert_eq!(
            parse(&["deposit", "4.5", "1.00"]),
            Err(ParseError::UnparseableNumber {
                name: "account number",
                value: "4.5".to_string()
            })
        );
        assert_eq!(
            parse(&["withdraw", "4", "ten"]),
            Err(ParseError::UnparseableNumber {
                name: "amount",
                value: "ten".to_string()
            })
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.50 "), Some(dec!(12.50)));
        assert_eq!(parse_amount("-3"), Some(dec!(-3)));
        assert_eq!(parse_amount("2.5e2"), Some(dec!(250)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_parse_amount_out_of_range() {
        assert_eq!(parse_amount("1e-40"), Some(Decimal::ZERO));
        assert_eq!(parse_amount("-1E-35"), Some(Decimal::ZERO));
        assert_eq!(parse_amount("1e100"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }
}
