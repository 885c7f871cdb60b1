//! CSV format handling for command rows and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to `Command`s
//! - Account output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input Format
//!
//! ```text
//! type,account,target,amount
//! open,A,,1000
//! deposit,A,,200
//! withdraw,A,,300
//! transfer,A,B,400
//! ```

use crate::types::{Account, AccountRequest, Command, OpenAccountRequest, TransferRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// `target` is only meaningful for transfers.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub command_type: String,
    pub account: String,
    pub target: Option<String>,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to a Command
///
/// This function:
/// - Parses the type string (case-insensitive)
/// - Parses the amount string into a Decimal
/// - Requires a target for transfers
///
/// Amount sign and blank accounts are not checked here; that is the job of
/// [`Command::validate`].
///
/// # Returns
///
/// Result containing either:
/// - Ok(Command) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Command, String> {
    let amount = match csv_record.amount.as_deref().map(str::trim) {
        Some(amount_str) if !amount_str.is_empty() => {
            Decimal::from_str(amount_str).map_err(|_| {
                format!(
                    "Invalid amount '{}' for account {}",
                    amount_str, csv_record.account
                )
            })?
        }
        _ => {
            return Err(format!(
                "{} command for account {} requires an amount",
                csv_record.command_type, csv_record.account
            ))
        }
    };

    let account_number = csv_record.account;

    match csv_record.command_type.to_lowercase().as_str() {
        "open" => Ok(Command::Open(OpenAccountRequest {
            account_number,
            initial_balance: amount,
        })),
        "deposit" => Ok(Command::Deposit(AccountRequest {
            account_number,
            amount,
        })),
        "withdraw" | "withdrawal" => Ok(Command::Withdraw(AccountRequest {
            account_number,
            amount,
        })),
        "transfer" => {
            let to_account = csv_record
                .target
                .filter(|target| !target.trim().is_empty())
                .ok_or_else(|| {
                    format!("Transfer from account {} requires a target", account_number)
                })?;
            Ok(Command::Transfer(TransferRequest {
                from_account: account_number,
                to_account,
                amount,
            }))
        }
        other => Err(format!(
            "Invalid command type: '{}' for account {}",
            other, account_number
        )),
    }
}

/// Write account states to CSV format
///
/// Writes accounts in CSV format with columns: account, balance.
/// Accounts are sorted by account number for deterministic output.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts: Vec<&Account> = accounts.iter().collect();
    sorted_accounts.sort_by(|a, b| a.number.cmp(&b.number));

    for account in sorted_accounts {
        writer
            .write_record(&[account.number.clone(), format!("{:.4}", account.balance)])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
