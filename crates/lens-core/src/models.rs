use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// A single lead record read from the recruiting extract.
///
/// The categorical fields are opaque strings consumed only for counting;
/// they are never interpreted or mutated after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    /// UTC timestamp of the invitation (`INVITATIONDT`).
    pub invited_at: DateTime<Utc>,
    /// Unique record identifier (`RECORDID`).
    pub record_id: String,
    /// Campaign title, if present.
    #[serde(default)]
    pub campaign_title: Option<String>,
    /// Sourcing channel, if present.
    #[serde(default)]
    pub source: Option<String>,
    /// Assigned manager, if present.
    #[serde(default)]
    pub assigned_manager: Option<String>,
    /// Folder the lead currently sits in, if present.
    #[serde(default)]
    pub folder: Option<String>,
    /// Completion method, if present.
    #[serde(default)]
    pub completion_method: Option<String>,
    /// Campaign type, if present.
    #[serde(default)]
    pub campaign_type: Option<String>,
    /// Campaign site, if present.
    #[serde(default)]
    pub campaign_site: Option<String>,
    /// Whether this lead is a repeat application (`REPEATAPPLICATION == "t"`).
    #[serde(default)]
    pub repeat_application: bool,
}

/// Calendar unit used to group records for trend charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Map a timestamp to its period key.
    ///
    /// * Daily   → `"2024-01-15"` (`%Y-%m-%d`)
    /// * Weekly  → `"2024-W03"` (ISO week, `%G-W%V`)
    /// * Monthly → `"2024-01"` (`%Y-%m`)
    ///
    /// All three formats are zero-padded so the keys sort chronologically
    /// as plain strings.
    pub fn period_key(&self, ts: DateTime<Utc>) -> String {
        match self {
            Granularity::Daily => ts.format("%Y-%m-%d").to_string(),
            Granularity::Weekly => ts.format("%G-W%V").to_string(),
            Granularity::Monthly => ts.format("%Y-%m").to_string(),
        }
    }

    /// Human-readable unit name for chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Daily => "day",
            Granularity::Weekly => "week",
            Granularity::Monthly => "month",
        }
    }
}

/// A named rule selecting a trailing span of time and the granularity used
/// to bucket it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeWindow {
    Last30Days,
    Last12Weeks,
    LastYear,
    AllTime,
}

impl TimeWindow {
    /// All windows in selector order.
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Last30Days,
        TimeWindow::Last12Weeks,
        TimeWindow::LastYear,
        TimeWindow::AllTime,
    ];

    /// The bucket granularity associated with this window.
    pub fn granularity(&self) -> Granularity {
        match self {
            TimeWindow::Last30Days => Granularity::Daily,
            TimeWindow::Last12Weeks => Granularity::Weekly,
            TimeWindow::LastYear | TimeWindow::AllTime => Granularity::Monthly,
        }
    }

    /// How many trailing buckets the trend chart keeps, or `None` for
    /// the unbounded all-time view.
    pub fn trailing_buckets(&self) -> Option<usize> {
        match self {
            TimeWindow::Last30Days => Some(30),
            TimeWindow::Last12Weeks => Some(12),
            TimeWindow::LastYear => Some(12),
            TimeWindow::AllTime => None,
        }
    }

    /// Compute the cutoff for this window from the dataset's maximum
    /// observed timestamp.
    ///
    /// The cutoff anchors on the data, not on wall-clock "today", so a
    /// stale extract still renders a meaningful trailing window.  Returns
    /// `None` for [`TimeWindow::AllTime`], which keeps everything.
    ///
    /// The one-year offset is calendar-aware (12 months back); when that
    /// date does not exist the offset degrades to 365 days.
    pub fn cutoff_from(&self, max_ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeWindow::Last30Days => Some(max_ts - Duration::days(30)),
            TimeWindow::Last12Weeks => Some(max_ts - Duration::weeks(12)),
            TimeWindow::LastYear => Some(
                max_ts
                    .checked_sub_months(Months::new(12))
                    .unwrap_or(max_ts - Duration::days(365)),
            ),
            TimeWindow::AllTime => None,
        }
    }

    /// Kebab-case name used by the CLI and the persisted settings file.
    pub fn as_name(&self) -> &'static str {
        match self {
            TimeWindow::Last30Days => "last-30-days",
            TimeWindow::Last12Weeks => "last-12-weeks",
            TimeWindow::LastYear => "last-1-year",
            TimeWindow::AllTime => "all-time",
        }
    }

    /// Display label shown in the window selector.
    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Last30Days => "Last 30 Days",
            TimeWindow::Last12Weeks => "Last 12 Weeks",
            TimeWindow::LastYear => "Last 1 Year",
            TimeWindow::AllTime => "All Time",
        }
    }

    /// Parse a kebab-case window name.
    pub fn from_name(name: &str) -> Option<TimeWindow> {
        match name {
            "last-30-days" => Some(TimeWindow::Last30Days),
            "last-12-weeks" => Some(TimeWindow::Last12Weeks),
            "last-1-year" => Some(TimeWindow::LastYear),
            "all-time" => Some(TimeWindow::AllTime),
            _ => None,
        }
    }
}

/// One time-period bucket: a period label paired with the count of records
/// falling in that period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// The period key, e.g. `"2024-01-15"`, `"2024-W03"` or `"2024-01"`.
    pub period: String,
    /// Number of records in this period.
    pub count: u64,
}

/// One entry of a top-K categorical ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// The category value, e.g. a campaign title.
    pub label: String,
    /// Number of records carrying this value.
    pub count: u64,
}

/// The categorical fields a ranking can be computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankField {
    CampaignTitle,
    Source,
    AssignedManager,
    Folder,
    CompletionMethod,
    CampaignType,
    CampaignSite,
}

impl RankField {
    /// All ranked fields in dashboard order.
    pub const ALL: [RankField; 7] = [
        RankField::CampaignTitle,
        RankField::Source,
        RankField::AssignedManager,
        RankField::Folder,
        RankField::CompletionMethod,
        RankField::CampaignType,
        RankField::CampaignSite,
    ];

    /// The value of this field on `record`, or `None` when absent.
    pub fn value<'a>(&self, record: &'a LeadRecord) -> Option<&'a str> {
        let opt = match self {
            RankField::CampaignTitle => &record.campaign_title,
            RankField::Source => &record.source,
            RankField::AssignedManager => &record.assigned_manager,
            RankField::Folder => &record.folder,
            RankField::CompletionMethod => &record.completion_method,
            RankField::CampaignType => &record.campaign_type,
            RankField::CampaignSite => &record.campaign_site,
        };
        opt.as_deref()
    }

    /// Chart title for this ranking.
    pub fn title(&self) -> &'static str {
        match self {
            RankField::CampaignTitle => "Top Campaign Titles",
            RankField::Source => "Top Sources",
            RankField::AssignedManager => "Top Assigned Managers",
            RankField::Folder => "Top Folder Occurrences",
            RankField::CompletionMethod => "Top Completion Methods",
            RankField::CampaignType => "Top Campaign Types",
            RankField::CampaignSite => "Lead Counts by Campaign Site",
        }
    }

    /// Fixed K for this field's top-K ranking.
    pub fn top_k(&self) -> usize {
        match self {
            RankField::CampaignTitle
            | RankField::Source
            | RankField::AssignedManager
            | RankField::Folder => 10,
            RankField::CompletionMethod | RankField::CampaignType | RankField::CampaignSite => 5,
        }
    }
}
