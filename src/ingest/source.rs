use crate::error::{Error, Result};
use crate::ingest::normalizer::RawRow;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Read up to `limit` rows of a headed CSV file.
///
/// Empty cells become `null` so that they take the same fallback path as
/// missing columns.
pub fn read_rows(path: &Path, limit: Option<usize>) -> Result<Vec<RawRow>> {
    if !path.is_file() {
        return Err(Error::NotFound(format!("CSV file not found: {}", path.display())));
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        if limit.is_some_and(|limit| rows.len() >= limit) {
            break;
        }
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (header.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_rows_with_limit_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name,minutes,ingredients_raw_str").unwrap();
        writeln!(file, "1,Soup,30,\"['water', 'salt, to taste']\"").unwrap();
        writeln!(file, "2,,NaN,").unwrap();
        writeln!(file, "3,Bread,90,flour").unwrap();
        file.flush().unwrap();

        let rows = read_rows(file.path(), Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["ingredients_raw_str"], Value::String("['water', 'salt, to taste']".into()));
        assert_eq!(rows[1]["name"], Value::Null);
        assert_eq!(rows[1]["minutes"], Value::String("NaN".into()));

        let rows = read_rows(file.path(), None).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_missing_csv_is_not_found() {
        let result = read_rows(Path::new("/nonexistent/recipes.csv"), None);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
