//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over commands from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator
//! - Errors are rendered from `LedgerError`, with the line number (header is line 1)
//!
//! ```no_run
//! use ledger_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("commands.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("Command: {:?}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{Command, LedgerError};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Reads one row at a time; memory use does not grow with file size.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Open a CSV file for streaming iteration
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing target/amount may be omitted)
    /// - Use an 8KB buffer
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(String)` rendered from `FileNotFound` or `IoError` otherwise
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path).map_err(|e| LedgerError::open_failed(path, e).to_string())?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Command, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();
        let next = deserializer.next()?;
        self.line_num += 1;

        let line = Some(self.line_num as u64 + 1);
        Some(match next {
            Ok(csv_record) => convert_csv_record(csv_record)
                .map_err(|e| LedgerError::parse_error(line, e).to_string()),
            Err(e) => Err(LedgerError::parse_error(line, e.to_string()).to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountRequest, TransferRequest};
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_reader_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "File not found: nonexistent.csv");
    }

    #[test]
    fn test_sync_reader_iterates_commands_in_order() {
        let file = create_temp_csv(
            "type,account,target,amount\n\
             deposit, A ,,100.0\n\
             transfer,A,B,25\n",
        );

        let commands: Vec<Command> = SyncReader::new(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            commands,
            vec![
                Command::Deposit(AccountRequest {
                    account_number: "A".to_string(),
                    amount: Decimal::new(1000, 1),
                }),
                Command::Transfer(TransferRequest {
                    from_account: "A".to_string(),
                    to_account: "B".to_string(),
                    amount: Decimal::new(25, 0),
                }),
            ]
        );
    }

    #[test]
    fn test_sync_reader_reports_bad_rows_and_continues() {
        let file = create_temp_csv(
            "type,account,target,amount\n\
             deposit,A,,abc\n\
             bogus,A,,1\n\
             deposit,A,,1\n",
        );

        let results: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap_err().starts_with("CSV parse error at line 2:"));
        assert!(results[1].as_ref().unwrap_err().starts_with("CSV parse error at line 3:"));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_sync_reader_accepts_short_rows() {
        let file = create_temp_csv("type,account,target,amount\nopen,A,,10\ndeposit,A\n");

        let results: Vec<_> = SyncReader::new(file.path()).unwrap().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().unwrap_err().contains("requires an amount"));
    }
}
