use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.leadlens/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.leadlens/`
/// - `~/.leadlens/logs/`
/// - `~/.leadlens/exports/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let lens_dir = home.join(".leadlens");
    std::fs::create_dir_all(&lens_dir)?;
    std::fs::create_dir_all(lens_dir.join("logs"))?;
    std::fs::create_dir_all(lens_dir.join("exports"))?;
    Ok(())
}

/// The directory invalid-row exports are written to.
pub fn export_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".leadlens").join("exports")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    // Map the CLI level names to tracing directives (tracing uses lowercase).
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Attempt to locate a lead extract on the local system.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `./TalkpushCI_data_fetch.csv` (the fetch script's default output name)
/// 2. `./leads.csv`
/// 3. `~/.leadlens/data/`
///
/// Returns `None` when nothing is found; the caller should then require an
/// explicit `--data` argument.
pub fn discover_data_path() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("TalkpushCI_data_fetch.csv"),
        PathBuf::from("leads.csv"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".leadlens").join("data"));
    }
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
