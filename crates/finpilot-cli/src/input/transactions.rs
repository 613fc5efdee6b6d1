use finpilot_core::types::Transaction;

/// Read categorised transactions from a CSV file with a
/// `description,amount,category` header row.
pub fn read_csv(path: &str) -> Result<Vec<Transaction>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to open '{path}': {e}"))?;
    let mut transactions = Vec::new();
    for record in reader.deserialize() {
        let tx: Transaction = record.map_err(|e| format!("Failed to parse '{path}': {e}"))?;
        transactions.push(tx);
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_reads_header_csv() {
        let mut file = tempfile_with(
            "description,amount,category\n\
             rent march,20000,housing\n\
             groceries,-8000,food\n",
        );
        file.flush().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let txs = read_csv(&path).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].category, "housing");
        assert_eq!(txs[0].amount, dec!(20000));
        assert_eq!(txs[1].amount, dec!(-8000));
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let file = tempfile_with("description,amount,category\nrent,not-a-number,housing\n");
        let path = file.path().to_str().unwrap().to_string();
        assert!(read_csv(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_csv("/nonexistent/transactions.csv").is_err());
    }

    fn tempfile_with(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }
}
