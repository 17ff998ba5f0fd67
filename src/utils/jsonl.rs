//! Line-delimited JSON helpers shared by every pipeline stage.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Serialize `value` as one line.
pub fn write_line<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Read every non-blank line of `path` as a `T`.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)
        .map_err(|e| Error::NotFound(format!("{}: {e}", path.display())))?;

    let mut records = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|e| {
            Error::Validation(format!("{}:{}: {e}", path.display(), line_no + 1))
        })?;
        records.push(record);
    }
    Ok(records)
}
