//! Ingress request types
//!
//! Requests are validated before they reach the core: blank account numbers
//! and non-positive amounts are rejected here so the core only ever sees
//! well-formed input.

use super::account::AccountNumber;
use super::error::LedgerError;
use rust_decimal::Decimal;

/// Open a new account with an initial balance
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAccountRequest {
    pub account_number: AccountNumber,
    pub initial_balance: Decimal,
}

/// Deposit into or withdraw from a single account
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRequest {
    pub account_number: AccountNumber,
    pub amount: Decimal,
}

/// Move funds between two accounts
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub from_account: AccountNumber,
    pub to_account: AccountNumber,
    pub amount: Decimal,
}

fn require_account_number(account: &str) -> Result<(), LedgerError> {
    if account.trim().is_empty() {
        return Err(LedgerError::invalid_account_number(account));
    }
    Ok(())
}

/// Reject zero and negative amounts
pub(crate) fn require_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

impl OpenAccountRequest {
    pub fn validate(&self) -> Result<(), LedgerError> {
        require_account_number(&self.account_number)?;
        require_positive(self.initial_balance)
    }
}

impl AccountRequest {
    pub fn validate(&self) -> Result<(), LedgerError> {
        require_account_number(&self.account_number)?;
        require_positive(self.amount)
    }
}

impl TransferRequest {
    /// Shape checks only
    ///
    /// Existence and distinctness of the two accounts are checked by the engine
    /// under the account locks.
    pub fn validate(&self) -> Result<(), LedgerError> {
        require_account_number(&self.from_account)?;
        require_account_number(&self.to_account)?;
        require_positive(self.amount)
    }
}

/// A single request to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open(OpenAccountRequest),
    Deposit(AccountRequest),
    Withdraw(AccountRequest),
    Transfer(TransferRequest),
}

impl Command {
    pub fn validate(&self) -> Result<(), LedgerError> {
        match self {
            Command::Open(request) => request.validate(),
            Command::Deposit(request) | Command::Withdraw(request) => request.validate(),
            Command::Transfer(request) => request.validate(),
        }
    }

    /// Account numbers this command touches, in request order
    pub fn accounts(&self) -> Vec<&str> {
        match self {
            Command::Open(request) => vec![request.account_number.as_str()],
            Command::Deposit(request) | Command::Withdraw(request) => {
                vec![request.account_number.as_str()]
            }
            Command::Transfer(request) => {
                vec![request.from_account.as_str(), request.to_account.as_str()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn account_request(account: &str, amount: Decimal) -> AccountRequest {
        AccountRequest {
            account_number: account.to_string(),
            amount,
        }
    }

    #[rstest]
    #[case::valid("A", Decimal::new(100, 0), None)]
    #[case::blank_account("", Decimal::new(100, 0), Some(LedgerError::invalid_account_number("")))]
    #[case::whitespace_account("   ", Decimal::new(100, 0), Some(LedgerError::invalid_account_number("   ")))]
    #[case::zero_amount("A", Decimal::ZERO, Some(LedgerError::invalid_amount(Decimal::ZERO)))]
    #[case::negative_amount("A", Decimal::new(-1, 2), Some(LedgerError::invalid_amount(Decimal::new(-1, 2))))]
    fn test_account_request_validation(
        #[case] account: &str,
        #[case] amount: Decimal,
        #[case] expected: Option<LedgerError>,
    ) {
        let result = account_request(account, amount).validate();
        assert_eq!(result.err(), expected);
    }

    #[test]
    fn test_open_request_rejects_zero_initial_balance() {
        let request = OpenAccountRequest {
            account_number: "A".to_string(),
            initial_balance: Decimal::ZERO,
        };

        assert_eq!(
            request.validate(),
            Err(LedgerError::invalid_amount(Decimal::ZERO))
        );
    }

    #[rstest]
    #[case::blank_from("", "B")]
    #[case::blank_to("A", " ")]
    fn test_transfer_request_rejects_blank_accounts(#[case] from: &str, #[case] to: &str) {
        let request = TransferRequest {
            from_account: from.to_string(),
            to_account: to.to_string(),
            amount: Decimal::ONE,
        };

        assert!(matches!(
            request.validate(),
            Err(LedgerError::InvalidAccountNumber { .. })
        ));
    }

    #[test]
    fn test_command_accounts() {
        let transfer = Command::Transfer(TransferRequest {
            from_account: "A".to_string(),
            to_account: "B".to_string(),
            amount: Decimal::ONE,
        });
        let deposit = Command::Deposit(account_request("C", Decimal::ONE));

        assert_eq!(transfer.accounts(), vec!["A", "B"]);
        assert_eq!(deposit.accounts(), vec!["C"]);
    }
}
