use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Handles timezone-aware timestamp parsing for the lead extract.
///
/// Extracts come out of different reporting tools with inconsistent date
/// shapes; offset-carrying timestamps are taken at face value while naive
/// ones are interpreted in the configured default timezone.
pub struct TimezoneHandler {
    default_tz: Tz,
}

/// Naive datetime formats seen across extract variants.
const DATETIME_FMTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats; parsed values are anchored at midnight.
const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

impl TimezoneHandler {
    /// Create a handler with the given IANA timezone name as the default.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Parse an extract timestamp string into a UTC [`DateTime`].
    ///
    /// Accepts RFC 3339 (including the `Z` suffix), the naive datetime
    /// formats in [`DATETIME_FMTS`] and the date-only formats in
    /// [`DATE_FMTS`].  Returns `None` for empty or unrecognised input; the
    /// caller decides whether that is a reportable invalid row.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        // Replace trailing 'Z' with '+00:00'.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in DATETIME_FMTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return self.localise(naive);
            }
        }

        for fmt in DATE_FMTS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                let naive = date.and_hms_opt(0, 0, 0)?;
                return self.localise(naive);
            }
        }

        None
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Convert a UTC [`DateTime`] to a specific named timezone.
    ///
    /// If the target timezone is invalid, falls back to the handler's default
    /// and logs a warning.
    pub fn convert_to_timezone(&self, dt: DateTime<Utc>, tz_name: &str) -> DateTime<Tz> {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: invalid target timezone \"{}\", using default",
                tz_name
            );
            self.default_tz
        });
        dt.with_timezone(&tz)
    }

    /// Expose the configured default timezone.
    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }

    /// Interpret a naive datetime in the default timezone.
    ///
    /// Ambiguous local times (DST fold) resolve to the earlier instant;
    /// non-existent local times (DST gap) yield `None`.
    fn localise(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.default_tz.from_local_datetime(&naive) {
            chrono::LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            chrono::LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
            chrono::LocalResult::None => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
