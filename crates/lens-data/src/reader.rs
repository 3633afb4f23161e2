//! CSV extract discovery and loading for LeadLens.
//!
//! Reads recruiting lead extracts (one row per lead invitation) and converts
//! them into [`LeadRecord`] structs for downstream aggregation.  Rows that
//! cannot be interpreted are never fatal: they are retained as
//! [`InvalidRow`]s so the dashboard can report and export them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lens_core::models::LeadRecord;
use lens_core::time_utils::TimezoneHandler;
use tracing::{debug, warn};

// ── Column names ──────────────────────────────────────────────────────────────

pub const COL_INVITATION_DT: &str = "INVITATIONDT";
pub const COL_RECORD_ID: &str = "RECORDID";
pub const COL_CAMPAIGN_TITLE: &str = "CAMPAIGNTITLE";
pub const COL_SOURCE: &str = "SOURCE";
pub const COL_ASSIGNED_MANAGER: &str = "ASSIGNEDMANAGER";
pub const COL_FOLDER: &str = "FOLDER";
pub const COL_COMPLETION_METHOD: &str = "COMPLETIONMETHOD";
pub const COL_REPEAT_APPLICATION: &str = "REPEATAPPLICATION";
pub const COL_CAMPAIGN_TYPE: &str = "CAMPAIGN_TYPE";
pub const COL_CAMPAIGN_SITE: &str = "CAMPAIGN_SITE";
pub const COL_INSTANCE: &str = "INSTANCE";

// ── Result types ──────────────────────────────────────────────────────────────

/// A source row that could not be converted into a [`LeadRecord`].
#[derive(Debug, Clone)]
pub struct InvalidRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    /// Why the row was rejected.
    pub reason: String,
    /// The raw field values, in source column order.
    pub fields: Vec<String>,
}

/// The outcome of loading one extract.
///
/// Loading never fails: a missing or unreadable source yields an empty
/// record list with `source_error` set, so the dashboard can render its
/// empty state instead of crashing.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Valid records, sorted ascending by `invited_at`.
    pub records: Vec<LeadRecord>,
    /// Rows rejected during parsing, in source order.
    pub invalid: Vec<InvalidRow>,
    /// The source header, kept for invalid-row export.
    pub header: Vec<String>,
    /// The file actually read, when one was resolved.
    pub source: Option<PathBuf>,
    /// Set when the source could not be located or opened at all.
    pub source_error: Option<String>,
    /// Rows dropped by the instance filter (valid but out of scope).
    pub filtered_out: u64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find the most recently modified `.csv` file under `dir`, searching
/// recursively.  Ties and unreadable metadata fall back to path order.
pub fn latest_csv_in(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<(std::time::SystemTime, PathBuf)> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| {
            let mtime = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            (mtime, entry.into_path())
        })
        .collect();

    candidates.sort();
    candidates.pop().map(|(_, path)| path)
}

/// Load lead records from `data_path`.
///
/// * `data_path` – a CSV file, or a directory whose newest CSV is used.
/// * `tz` – timezone handler used to interpret naive extract timestamps.
/// * `instance` – when set, only rows whose `INSTANCE` column matches
///   (case-insensitive) are kept; mismatches are counted in `filtered_out`.
pub fn load_leads(data_path: &Path, tz: &TimezoneHandler, instance: Option<&str>) -> LoadResult {
    let source = match resolve_source_file(data_path) {
        Ok(path) => path,
        Err(message) => {
            warn!("{}", message);
            return LoadResult {
                source_error: Some(message),
                ..Default::default()
            };
        }
    };

    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&source)
    {
        Ok(r) => r,
        Err(e) => {
            let message = format!("Failed to read {}: {}", source.display(), e);
            warn!("{}", message);
            return LoadResult {
                source: Some(source),
                source_error: Some(message),
                ..Default::default()
            };
        }
    };

    let header: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|s| s.to_string()).collect(),
        Err(e) => {
            let message = format!("Failed to read header of {}: {}", source.display(), e);
            warn!("{}", message);
            return LoadResult {
                source: Some(source),
                source_error: Some(message),
                ..Default::default()
            };
        }
    };

    let columns = match ColumnMap::from_header(&header) {
        Ok(c) => c,
        Err(missing) => {
            let message = format!(
                "{} is missing required column {}",
                source.display(),
                missing
            );
            warn!("{}", message);
            return LoadResult {
                source: Some(source),
                header,
                source_error: Some(message),
                ..Default::default()
            };
        }
    };

    let mut result = LoadResult {
        source: Some(source.clone()),
        header,
        ..Default::default()
    };

    // Header occupies line 1; data starts at line 2.
    let mut line: u64 = 1;
    for row in reader.records() {
        line += 1;

        let record = match row {
            Ok(r) => r,
            Err(e) => {
                result.invalid.push(InvalidRow {
                    line,
                    reason: format!("unreadable row: {}", e),
                    fields: Vec::new(),
                });
                continue;
            }
        };

        if let Some(tag) = instance {
            let row_tag = columns.get(&record, COL_INSTANCE).unwrap_or("");
            if !row_tag.eq_ignore_ascii_case(tag) {
                result.filtered_out += 1;
                continue;
            }
        }

        match parse_row(&record, &columns, tz) {
            Ok(lead) => result.records.push(lead),
            Err(reason) => result.invalid.push(InvalidRow {
                line,
                reason,
                fields: record.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    result.records.sort_by_key(|r| r.invited_at);

    debug!(
        "Loaded {} from {}: {} valid, {} invalid, {} filtered out",
        result.records.len() + result.invalid.len() + result.filtered_out as usize,
        source.display(),
        result.records.len(),
        result.invalid.len(),
        result.filtered_out,
    );

    result
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Resolve the extract file: a CSV path is used directly, a directory
/// yields its newest CSV.  Returns a human-readable message on failure.
fn resolve_source_file(data_path: &Path) -> Result<PathBuf, String> {
    if !data_path.exists() {
        return Err(format!("Data path not found: {}", data_path.display()));
    }

    if data_path.is_dir() {
        return latest_csv_in(data_path)
            .ok_or_else(|| format!("No CSV files found in {}", data_path.display()));
    }

    Ok(data_path.to_path_buf())
}

/// Case-insensitive mapping from column name to field index.
struct ColumnMap {
    by_name: HashMap<String, usize>,
}

impl ColumnMap {
    /// Build the map, requiring `INVITATIONDT` and `RECORDID` to exist.
    fn from_header(header: &[String]) -> Result<ColumnMap, String> {
        let by_name: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_ascii_uppercase(), i))
            .collect();

        let map = ColumnMap { by_name };
        for required in [COL_INVITATION_DT, COL_RECORD_ID] {
            if !map.by_name.contains_key(required) {
                return Err(required.to_string());
            }
        }
        Ok(map)
    }

    /// Fetch the trimmed value of `column` on `record`, `None` when the
    /// column is absent or the cell is empty.
    fn get<'a>(&self, record: &'a csv::StringRecord, column: &str) -> Option<&'a str> {
        let idx = *self.by_name.get(column)?;
        let value = record.get(idx)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Convert one CSV row into a [`LeadRecord`], or describe why it can't be.
fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnMap,
    tz: &TimezoneHandler,
) -> Result<LeadRecord, String> {
    let raw_ts = columns
        .get(record, COL_INVITATION_DT)
        .ok_or_else(|| format!("empty {}", COL_INVITATION_DT))?;

    let invited_at = tz
        .parse_timestamp(raw_ts)
        .ok_or_else(|| format!("unparseable {}: {:?}", COL_INVITATION_DT, raw_ts))?;

    let record_id = columns
        .get(record, COL_RECORD_ID)
        .ok_or_else(|| format!("empty {}", COL_RECORD_ID))?
        .to_string();

    let repeat_application = columns
        .get(record, COL_REPEAT_APPLICATION)
        .map(|v| v.eq_ignore_ascii_case("t") || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let field = |column: &str| columns.get(record, column).map(|s| s.to_string());

    Ok(LeadRecord {
        invited_at,
        record_id,
        campaign_title: field(COL_CAMPAIGN_TITLE),
        source: field(COL_SOURCE),
        assigned_manager: field(COL_ASSIGNED_MANAGER),
        folder: field(COL_FOLDER),
        completion_method: field(COL_COMPLETION_METHOD),
        campaign_type: field(COL_CAMPAIGN_TYPE),
        campaign_site: field(COL_CAMPAIGN_SITE),
        repeat_application,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
