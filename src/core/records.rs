use crate::utils::error::{EtlError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone)]
pub struct DecodedRows<T> {
    pub rows: Vec<T>,
    /// `"{source} row {n}"` for each row that could not be decoded.
    pub skipped: Vec<String>,
}

/// Decodes a headed CSV. A leading byte-order mark is ignored, short rows are
/// tolerated and rows that fail to decode are skipped and counted.
pub fn decode_csv<T: DeserializeOwned>(data: &[u8], source: &str) -> Result<DecodedRows<T>> {
    decode_csv_where(data, source, |_| true)
}

/// Like [`decode_csv`], but only rows accepted by `keep` are retained. Rows
/// are tested as they are read, so rejected rows are never collected.
pub fn decode_csv_where<T, F>(data: &[u8], source: &str, mut keep: F) -> Result<DecodedRows<T>>
where
    T: DeserializeOwned,
    F: FnMut(&T) -> bool,
{
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    // Header problems are fatal; everything after is per-row.
    reader.headers()?;

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) if keep(&row) => rows.push(row),
            Ok(_) => {}
            Err(e) => {
                // +2: one-based, after the header line
                let label = format!("{} row {}", source, index + 2);
                tracing::warn!("Skipping {}: {}", label, e);
                skipped.push(label);
            }
        }
    }

    tracing::debug!("Decoded {} rows from {} ({} skipped)", rows.len(), source, skipped.len());
    Ok(DecodedRows { rows, skipped })
}

/// One JSON object per non-blank line.
pub fn decode_ndjson<T: DeserializeOwned>(data: &[u8], source: &str) -> Result<Vec<T>> {
    let text = std::str::from_utf8(data).map_err(|e| EtlError::ProcessingError {
        message: format!("{} is not valid UTF-8: {}", source, e),
    })?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| EtlError::ProcessingError {
                message: format!("{} line {}: {}", source, index + 1, e),
            })
        })
        .collect()
}

pub fn encode_ndjson<T: Serialize>(items: &[T]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for item in items {
        serde_json::to_writer(&mut out, item)?;
        out.push(b'\n');
    }
    Ok(out)
}
