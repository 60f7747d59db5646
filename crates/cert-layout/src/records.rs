use crate::types::{CertError, Result};
use crate::variables::Record;
use std::path::Path;

/// Load records from a CSV file. The header row names the fields; every
/// following row becomes one record. Blank cells are omitted.
pub async fn load_records_csv(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref().to_owned();

    let contents = tokio::fs::read_to_string(&path).await?;

    let records = tokio::task::spawn_blocking(move || parse_records_csv(&contents)).await??;

    log::info!("Loaded {} record(s) from {}", records.len(), path.display());
    Ok(records)
}

pub fn parse_records_csv(contents: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.to_string(), serde_json::Value::String(value.to_string())))
            .collect();
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

/// Load records from a JSON array of objects
pub async fn load_records_json(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref().to_owned();
    let json = tokio::fs::read_to_string(&path).await?;
    let records = parse_records_json(&json)?;
    log::info!("Loaded {} record(s) from {}", records.len(), path.display());
    Ok(records)
}

pub fn parse_records_json(json: &str) -> Result<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        // A single object is one record
        serde_json::Value::Object(map) => return Ok(vec![map]),
        _ => {
            return Err(CertError::Config(
                "Records JSON must be an array of objects".to_string(),
            ));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(CertError::Config(format!("Record {} is not an object", i))),
        })
        .collect()
}
