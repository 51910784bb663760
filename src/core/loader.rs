use crate::core::CountryQuery;
use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Field delimiter inferred from the file extension (`.tsv` is tab separated).
pub fn delimiter_for(path: &str) -> u8 {
    match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") => b'\t',
        _ => b',',
    }
}

/// Reads country names from `column` of a delimited file with a header row.
///
/// Names are trimmed; blank cells and repeated names are skipped, keeping the
/// first occurrence.
pub fn parse_country_names(data: &[u8], column: &str, delimiter: u8) -> Result<Vec<CountryQuery>> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| EtlError::ValidationError {
            message: format!(
                "column '{}' not found; available columns: {}",
                column,
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
        })?;

    let mut seen = HashSet::new();
    let mut queries = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let name = record.get(index).map(str::trim).unwrap_or_default();

        if name.is_empty() {
            tracing::debug!("Skipping row {} without a name", line + 2);
            continue;
        }
        if !seen.insert(name.to_string()) {
            tracing::debug!("Skipping duplicate name '{}'", name);
            continue;
        }
        queries.push(CountryQuery::new(name));
    }

    Ok(queries)
}
