//! Invalid-row export.
//!
//! Writes the rows rejected during loading back out as CSV so they can be
//! inspected or repaired outside the dashboard.

use std::path::{Path, PathBuf};

use chrono::Utc;
use lens_core::Result;
use tracing::info;

use crate::reader::InvalidRow;

/// Write `invalid` to a timestamped CSV inside `export_dir` and return the
/// created path.
///
/// The output carries a `LINE` and `REASON` column followed by the source
/// extract's own columns; rows shorter than the source header are padded
/// by the flexible writer.  The directory is created when absent.
pub fn write_invalid_rows(
    invalid: &[InvalidRow],
    source_header: &[String],
    export_dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(export_dir)?;

    let filename = format!("invalid_rows_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));
    let path = export_dir.join(filename);

    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&path)?;

    let mut header: Vec<&str> = vec!["LINE", "REASON"];
    header.extend(source_header.iter().map(|s| s.as_str()));
    writer.write_record(&header)?;

    for row in invalid {
        let mut fields: Vec<String> = Vec::with_capacity(2 + row.fields.len());
        fields.push(row.line.to_string());
        fields.push(row.reason.clone());
        fields.extend(row.fields.iter().cloned());
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    info!("Exported {} invalid rows to {}", invalid.len(), path.display());

    Ok(path)
}
