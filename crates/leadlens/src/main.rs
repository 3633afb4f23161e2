mod bootstrap;

use anyhow::Result;
use lens_core::models::TimeWindow;
use lens_core::settings::{LastUsedParams, Settings};
use lens_core::time_utils::TimezoneHandler;
use lens_runtime::DataManager;
use lens_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("LeadLens v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Window: {}, Theme: {}, Timezone: {}",
        settings.window,
        settings.theme,
        settings.timezone
    );

    let Some(data_path) = settings.data.clone().or_else(bootstrap::discover_data_path) else {
        anyhow::bail!("no lead extract found; pass one with --data <file-or-directory>");
    };
    tracing::info!("Reading lead data from {}", data_path.display());

    let window = TimeWindow::from_name(&settings.window).unwrap_or(TimeWindow::Last30Days);
    let timezone = TimezoneHandler::new(&settings.timezone);
    let mut data_manager = DataManager::new(data_path, timezone, settings.instance.clone());

    let app = App::new(&settings.theme, window, settings.timezone.clone());
    let export_dir = bootstrap::export_dir();

    // Run the TUI event loop. The loop exits on 'q' / Ctrl+C inside the TUI.
    // We also listen for Ctrl+C at the OS level so that signals received
    // while the terminal is still starting up are handled cleanly.
    tokio::select! {
        result = app.run(&mut data_manager, &export_dir) => {
            let final_window = result?;

            // Persist the window the user ended on for the next run.
            let mut params = LastUsedParams::load();
            params.window = Some(final_window.as_name().to_string());
            if let Err(e) = params.save() {
                tracing::warn!(error = %e, "failed to persist last-used window");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
        }
    }

    Ok(())
}
