use crate::core::BorderingPair;
use crate::domain::model::OutputFormat;
use crate::utils::error::{EtlError, Result};

pub const HEADER: [&str; 4] = ["name", "code", "bordering_name", "bordering_code"];

/// Renders rows as a delimited table. The header is always written, so an
/// empty row set yields a header-only table.
pub fn render_table(rows: &[BorderingPair], format: OutputFormat) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| EtlError::processing(format!("output is not UTF-8: {}", e)))
}
