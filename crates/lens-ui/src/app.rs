//! Main application state and TUI event loop for LeadLens.
//!
//! [`App`] owns the theme, the selected time window and the current page.
//! It drives the crossterm event loop, pulls dataset snapshots from the
//! [`DataManager`] and rebuilds the dashboard whenever the window changes
//! or the extract is refreshed.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use lens_core::models::TimeWindow;
use lens_data::analysis::{build_dashboard, Dashboard};
use lens_data::export::write_invalid_rows;
use lens_runtime::DataManager;

use crate::chart_view;
use crate::themes::Theme;

// ── Page ──────────────────────────────────────────────────────────────────────

/// Which dashboard page the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Lead trend and repeat-application trend.
    Trends,
    /// Campaign title, source, manager and folder rankings.
    Campaigns,
    /// Completion method, campaign type and site rankings.
    Breakdown,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Trends, Page::Campaigns, Page::Breakdown];

    pub fn next(self) -> Page {
        match self {
            Page::Trends => Page::Campaigns,
            Page::Campaigns => Page::Breakdown,
            Page::Breakdown => Page::Trends,
        }
    }

    pub fn prev(self) -> Page {
        match self {
            Page::Trends => Page::Breakdown,
            Page::Campaigns => Page::Trends,
            Page::Breakdown => Page::Campaigns,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Trends => "Trends",
            Page::Campaigns => "Campaigns",
            Page::Breakdown => "Breakdown",
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the LeadLens TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Currently selected time window.
    pub window: TimeWindow,
    /// Human-readable timezone string shown in the header.
    pub timezone: String,
    /// Current dashboard page.
    pub page: Page,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Transient status message shown in the footer.
    pub status: Option<String>,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(theme_name: &str, window: TimeWindow, timezone: String) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            window,
            timezone,
            page: Page::Trends,
            should_quit: false,
            status: None,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the dashboard TUI until the user quits.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// the terminal event loop stays on the current thread; the data manager
    /// only re-reads the extract when its mtime changes, so the redraw tick
    /// is cheap.
    ///
    /// Returns the window that was active at exit, so the caller can persist
    /// it for the next run.  The loop exits on `q`, `Q`, or `Ctrl+C`.
    pub async fn run(
        mut self,
        data_manager: &mut DataManager,
        export_dir: &Path,
    ) -> io::Result<TimeWindow> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            let (dashboard, invalid_count, source_error, source_label) = {
                let snapshot = data_manager.get_data(false);
                (
                    build_dashboard(&snapshot.records, self.window),
                    snapshot.invalid.len(),
                    snapshot.source_error.clone(),
                    snapshot
                        .source
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                )
            };

            terminal.draw(|frame| {
                self.render(
                    frame,
                    &dashboard,
                    invalid_count,
                    source_error.as_deref(),
                    &source_label,
                )
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key, data_manager, export_dir);
                }
            }

            if self.should_quit {
                break Ok(self.window);
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    /// Apply one key press to the application state.
    fn handle_key(&mut self, key: KeyEvent, data_manager: &mut DataManager, export_dir: &Path) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,

            KeyCode::Char(c @ '1'..='4') => {
                let index = (c as usize) - ('1' as usize);
                let window = TimeWindow::ALL[index];
                if window != self.window {
                    self.window = window;
                    self.status = None;
                }
            }

            KeyCode::Char('r') | KeyCode::Char('R') => {
                data_manager.invalidate_cache();
                self.status = Some("Data reloaded".to_string());
            }

            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.status = Some(self.export_invalid(data_manager, export_dir));
            }

            KeyCode::Tab | KeyCode::Right => self.page = self.page.next(),
            KeyCode::BackTab | KeyCode::Left => self.page = self.page.prev(),

            _ => {}
        }
    }

    /// Export the current snapshot's invalid rows, returning a status line.
    fn export_invalid(&self, data_manager: &mut DataManager, export_dir: &Path) -> String {
        let (invalid, header): (Vec<_>, Vec<String>) = {
            let snapshot = data_manager.get_data(false);
            (snapshot.invalid.clone(), snapshot.header.clone())
        };

        if invalid.is_empty() {
            return "No invalid rows to export".to_string();
        }

        match write_invalid_rows(&invalid, &header, export_dir) {
            Ok(path) => format!("Exported {} invalid rows to {}", invalid.len(), path.display()),
            Err(e) => {
                tracing::warn!(error = %e, "invalid-row export failed");
                format!("Export failed: {}", e)
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    fn render(
        &self,
        frame: &mut Frame,
        dashboard: &Dashboard,
        invalid_count: usize,
        source_error: Option<&str>,
        source_label: &str,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], dashboard, invalid_count, source_label);

        let body = chunks[1];
        if dashboard.total_leads == 0 {
            match source_error {
                Some(message) => chart_view::render_source_error(frame, body, message, &self.theme),
                None => chart_view::render_no_data(frame, body, &self.theme),
            }
        } else {
            match self.page {
                Page::Trends => self.render_trends_page(frame, body, dashboard),
                Page::Campaigns => self.render_ranking_grid(frame, body, dashboard, 0, 4),
                Page::Breakdown => self.render_breakdown_page(frame, body, dashboard),
            }
        }

        self.render_footer(frame, chunks[2], dashboard);
    }

    fn render_header(
        &self,
        frame: &mut Frame,
        area: Rect,
        dashboard: &Dashboard,
        invalid_count: usize,
        source_label: &str,
    ) {
        let mut selector: Vec<Span> =
            vec![Span::styled("LeadLens ", self.theme.header), Span::raw(" ")];
        for (i, window) in TimeWindow::ALL.iter().enumerate() {
            let style = if *window == self.window {
                self.theme.selector_active
            } else {
                self.theme.selector_inactive
            };
            selector.push(Span::styled(format!(" [{}] {} ", i + 1, window.label()), style));
            selector.push(Span::raw(" "));
        }

        let repeat_total: u64 = dashboard.repeat_trend.iter().map(|b| b.count).sum();
        let repeat_share = if dashboard.total_leads > 0 {
            repeat_total as f64 / dashboard.total_leads as f64
        } else {
            0.0
        };

        let mut summary: Vec<Span> = vec![
            Span::styled("Leads: ", self.theme.label),
            Span::styled(
                lens_core::formatting::format_count(dashboard.total_leads),
                self.theme.value,
            ),
            Span::styled("   Repeat: ", self.theme.label),
            Span::styled(
                lens_core::formatting::format_percent(repeat_share),
                self.theme.value,
            ),
            Span::styled("   Invalid rows: ", self.theme.label),
            Span::styled(invalid_count.to_string(), self.theme.value),
            Span::styled("   Page: ", self.theme.label),
            Span::styled(self.page.title(), self.theme.value),
            Span::styled("   TZ: ", self.theme.label),
            Span::styled(self.timezone.clone(), self.theme.value),
        ];
        if !dashboard.errors.is_empty() {
            summary.push(Span::styled(
                format!("   {} chart error(s)", dashboard.errors.len()),
                self.theme.warning,
            ));
        }

        let lines = vec![
            Line::from(selector),
            Line::from(summary),
            Line::from(Span::styled(source_label.to_string(), self.theme.dim)),
        ];
        frame.render_widget(Paragraph::new(ratatui::text::Text::from(lines)), area);
    }

    fn render_trends_page(&self, frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let unit = dashboard.granularity.label();
        chart_view::render_trend(
            frame,
            halves[0],
            &format!("Leads per {}", unit),
            &dashboard.trend,
            &self.theme,
        );
        chart_view::render_trend(
            frame,
            halves[1],
            &format!("Repeat applications per {}", unit),
            &dashboard.repeat_trend,
            &self.theme,
        );
    }

    /// Render rankings `[from, to)` in a 2x2 grid.
    fn render_ranking_grid(
        &self,
        frame: &mut Frame,
        area: Rect,
        dashboard: &Dashboard,
        from: usize,
        to: usize,
    ) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let cells: Vec<Rect> = rows
            .iter()
            .flat_map(|row| {
                Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(*row)
                    .to_vec()
            })
            .collect();

        for (cell, chart) in cells.iter().zip(&dashboard.rankings[from..to.min(dashboard.rankings.len())]) {
            chart_view::render_ranking(frame, *cell, chart, &self.theme);
        }
    }

    fn render_breakdown_page(&self, frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
        let thirds = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(area);

        for (cell, chart) in thirds.iter().zip(&dashboard.rankings[4..]) {
            chart_view::render_ranking(frame, *cell, chart, &self.theme);
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
        let mut spans = vec![Span::styled(
            " 1-4 window · Tab/arrows page · r refresh · e export invalid · q quit ",
            self.theme.dim,
        )];
        if let Some(status) = &self.status {
            spans.push(Span::styled(format!("  {}", status), self.theme.success));
        } else if let Some(error) = dashboard.errors.first() {
            spans.push(Span::styled(format!("  {}", error), self.theme.warning));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
