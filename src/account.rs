use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub type AccountId = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub holder_name: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(id: AccountId, holder_name: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id,
            holder_name: holder_name.into(),
            balance,
        }
    }
}

/// Rounds half away from zero to cents, the way the summaries display money.
fn to_cents(amount: Decimal) -> Decimal {
    let mut cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(2);
    cents
}

// One-line summary used by the batch program:
// `{accountNumber: 100, holderName: Alice, balance: 75.00}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary<'a> {
    account_number: AccountId,
    holder_name: &'a str,
    balance: Decimal,
}

impl<'a> From<&'a Account> for AccountSummary<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            account_number: account.id,
            holder_name: &account.holder_name,
            balance: to_cents(account.balance),
        }
    }
}

impl fmt::Display for AccountSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{accountNumber: {}, holderName: {}, balance: {:.2}}}",
            self.account_number, self.holder_name, self.balance
        )
    }
}

/// Labeled multi-line report shown by the interactive menu.
pub struct BalanceReport<'a>(pub &'a Account);

impl fmt::Display for BalanceReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Account Number: {}", self.0.id)?;
        writeln!(f, "Holder Name: {}", self.0.holder_name)?;
        write!(f, "Balance: {:.2}", to_cents(self.0.balance))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_summary_format() {
        let account = Account::new(100, "Alice", dec!(75));
        assert_eq!(
            AccountSummary::from(&account).to_string(),
            "{accountNumber: 100, holderName: Alice, balance: 75.00}"
        );
    }

    #[test]
    fn test_summary_rounds_half_away_from_zero() {
        let account = Account::new(7, "Bob", dec!(10.005));
        assert_eq!(
            AccountSummary::from(&account).to_string(),
            "{accountNumber: 7, holderName: Bob, balance: 10.01}"
        );

        let account = Account::new(7, "Bob", dec!(0.1234));
        assert_eq!(
            AccountSummary::from(&account).to_string(),
            "{accountNumber: 7, holderName: Bob, balance: 0.12}"
        );
    }

    #[test]
    fn test_summary_balance_always_has_cents() {
        let account = Account::new(5, "Bob", dec!(5));
        assert_eq!(AccountSummary::from(&account).balance.to_string(), "5.00");

        let account = Account::new(5, "Bob", dec!(-2.5));
        assert_eq!(AccountSummary::from(&account).balance.to_string(), "-2.50");
    }

    #[test]
    fn test_balance_report() {
        let account = Account::new(42, "Carol Smith", dec!(1234.5));
        assert_eq!(
            BalanceReport(&account).to_string(),
            "Account Number: 42\nHolder Name: Carol Smith\nBalance: 1234.50"
        );
    }
}
