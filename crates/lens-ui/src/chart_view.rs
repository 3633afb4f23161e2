//! Bar-chart views for the LeadLens TUI.
//!
//! Every chart renders as horizontal count bars inside a bordered block:
//! a fixed-width label, a filled/empty bar scaled against the largest
//! count, and the count itself.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use lens_core::formatting;
use lens_core::models::Bucket;
use lens_data::analysis::RankingChart;

use crate::themes::Theme;

const FILLED: &str = "\u{2588}"; // █  FULL BLOCK
const EMPTY: &str = "\u{2591}"; // ░  LIGHT SHADE

/// Width reserved for the label column in trend charts (period keys are at
/// most 10 chars wide).
const TREND_LABEL_WIDTH: usize = 10;

/// Width reserved for the label column in ranking charts.
const RANK_LABEL_WIDTH: usize = 24;

// ── Public API ────────────────────────────────────────────────────────────────

/// Render a per-period trend chart (one bar per bucket) into `area`.
pub fn render_trend(frame: &mut Frame, area: Rect, title: &str, buckets: &[Bucket], theme: &Theme) {
    render_bars(
        frame,
        area,
        title,
        buckets
            .iter()
            .map(|b| (b.period.as_str(), b.count))
            .collect(),
        TREND_LABEL_WIDTH,
        theme,
    );
}

/// Render one top-K ranking chart into `area`.
pub fn render_ranking(frame: &mut Frame, area: Rect, chart: &RankingChart, theme: &Theme) {
    render_bars(
        frame,
        area,
        chart.field.title(),
        chart
            .entries
            .iter()
            .map(|e| (e.label.as_str(), e.count))
            .collect(),
        RANK_LABEL_WIDTH,
        theme,
    );
}

/// Render a placeholder when the selected window holds no records.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No leads in this window", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Try a wider window (keys 1-4) or refresh with 'r'.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text))
            .block(Block::default().borders(Borders::ALL).title(" LeadLens ")),
        area,
    );
}

/// Render the load-failure placeholder carrying the loader's message.
pub fn render_source_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Could not load lead data", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.dim)),
        Line::from(""),
        Line::from(Span::styled(
            "Check the --data path, then refresh with 'r'.",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text))
            .block(Block::default().borders(Borders::ALL).title(" LeadLens ")),
        area,
    );
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Shared renderer for trend and ranking charts.
fn render_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: Vec<(&str, u64)>,
    label_width: usize,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {} ", title), theme.chart_title));

    if rows.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled("no data", theme.dim))).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let max_count = rows.iter().map(|(_, c)| *c).max().unwrap_or(0);

    // Columns inside the borders: label + space + bar + space + count.
    let inner_width = area.width.saturating_sub(2) as usize;
    let count_width = formatting::format_count(max_count).len();
    let bar_width = inner_width.saturating_sub(label_width + count_width + 2);

    let lines: Vec<Line> = rows
        .iter()
        .map(|(label, count)| bar_line(label, *count, max_count, label_width, bar_width, theme))
        .collect();

    frame.render_widget(Paragraph::new(ratatui::text::Text::from(lines)).block(block), area);
}

/// Build one `label |████░░ count` line.
fn bar_line(
    label: &str,
    count: u64,
    max_count: u64,
    label_width: usize,
    bar_width: usize,
    theme: &Theme,
) -> Line<'static> {
    let filled = if max_count == 0 || bar_width == 0 {
        0
    } else {
        // Non-zero counts always show at least one cell.
        (((count as f64 / max_count as f64) * bar_width as f64).round() as usize)
            .clamp(usize::from(count > 0), bar_width)
    };
    let empty = bar_width - filled;

    Line::from(vec![
        Span::styled(fit_label(label, label_width), theme.bar_label),
        Span::raw(" "),
        Span::styled(FILLED.repeat(filled), theme.bar_fill),
        Span::styled(EMPTY.repeat(empty), theme.bar_empty),
        Span::raw(" "),
        Span::styled(formatting::format_count(count), theme.value),
    ])
}

/// Truncate `label` to `width` display columns (unicode-aware), padding
/// with spaces so every bar starts in the same column.
fn fit_label(label: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;

    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width.saturating_sub(1) && label.width() > width {
            out.push('\u{2026}'); // …
            used += 1;
            break;
        }
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }

    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lens_core::models::{RankEntry, RankField};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buckets() -> Vec<Bucket> {
        vec![
            Bucket {
                period: "2024-01-15".to_string(),
                count: 12,
            },
            Bucket {
                period: "2024-01-16".to_string(),
                count: 3,
            },
        ]
    }

    // ── fit_label ─────────────────────────────────────────────────────────

    #[test]
    fn test_fit_label_pads_short_labels() {
        let fitted = fit_label("Inbox", 10);
        assert_eq!(fitted.len(), 10);
        assert!(fitted.starts_with("Inbox"));
    }

    #[test]
    fn test_fit_label_truncates_with_ellipsis() {
        let fitted = fit_label("A very long campaign title indeed", 10);
        assert_eq!(fitted.width(), 10);
        assert!(fitted.contains('\u{2026}'));
    }

    #[test]
    fn test_fit_label_exact_width_untouched() {
        let fitted = fit_label("0123456789", 10);
        assert_eq!(fitted, "0123456789");
    }

    // ── bar_line ──────────────────────────────────────────────────────────

    #[test]
    fn test_bar_line_scales_to_max() {
        let theme = Theme::dark();
        let line = bar_line("2024-01-15", 10, 10, 10, 20, &theme);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered.matches(FILLED).count(), 20);
        assert_eq!(rendered.matches(EMPTY).count(), 0);
    }

    #[test]
    fn test_bar_line_nonzero_count_shows_at_least_one_cell() {
        let theme = Theme::dark();
        let line = bar_line("x", 1, 1000, 10, 20, &theme);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered.matches(FILLED).count(), 1);
    }

    #[test]
    fn test_bar_line_zero_count_is_all_empty() {
        let theme = Theme::dark();
        let line = bar_line("x", 0, 10, 10, 20, &theme);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered.matches(FILLED).count(), 0);
        assert_eq!(rendered.matches(EMPTY).count(), 20);
    }

    // ── Render (does not panic) ───────────────────────────────────────────

    #[test]
    fn test_render_trend_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_trend(frame, area, "Leads per day", &buckets(), &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_trend_empty_buckets_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_trend(frame, area, "Leads per day", &[], &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_ranking_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let chart = RankingChart {
            field: RankField::Source,
            entries: vec![
                RankEntry {
                    label: "Facebook".to_string(),
                    count: 40,
                },
                RankEntry {
                    label: "Referral with an extremely long channel name".to_string(),
                    count: 22,
                },
            ],
        };

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_ranking(frame, area, &chart, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_in_tiny_area_does_not_panic() {
        let backend = TestBackend::new(12, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_trend(frame, area, "Leads", &buckets(), &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_source_error_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_source_error(frame, area, "Data path not found: ./leads.csv", &theme);
            })
            .unwrap();
    }
}
