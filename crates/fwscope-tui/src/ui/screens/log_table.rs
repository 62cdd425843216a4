use chrono::DateTime;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use fwscope_logs::PageView;
use fwscope_types::{LogEntry, QueryMode};

use crate::{
    app::AppState,
    ui::{
        Layout, Theme,
        components::{StatusBar, log_table_hints},
    },
};

/// The paginated log table with filter header and optional risk details
pub struct LogTableScreen;

impl LogTableScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let area = frame.area();
        let (header_area, content_area, status_area) = Layout::main(area);

        Self::render_header(frame, header_area, state);

        // A failed fetch replaces the table entirely
        if let Some(error) = state.browser.error() {
            let message = Paragraph::new(vec![
                Line::from(Span::styled(error.to_string(), Theme::error())),
                Line::from(""),
                Line::from(Span::styled("[r] Retry", Theme::text_dim())),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Self::block(" Logs "));
            frame.render_widget(message, content_area);
        } else {
            let (table_area, details_area) =
                Layout::log_table(content_area, state.ui_state.details_visible);
            Self::render_table(frame, table_area, state);
            if let Some(details_area) = details_area {
                Self::render_details(frame, details_area, state);
            }
        }

        Self::render_status_bar(frame, status_area, state);
    }

    fn block(title: &str) -> Block<'_> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(title, Theme::title()))
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let browser = &state.browser;
        let criteria = browser.criteria();

        let (mode_label, mode_style) = match browser.mode() {
            QueryMode::Remote => (browser.mode().label().to_string(), Theme::text()),
            QueryMode::Local => (
                format!("{} (first {})", browser.mode().label(), browser.ceiling()),
                Theme::text_highlight(),
            ),
        };

        let mut spans = vec![
            Span::styled("fwscope", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(criteria.describe(), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(mode_label, mode_style),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(format!("{} per page", browser.page().limit), Theme::text()),
        ];

        if browser.is_loading() {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled("loading…", Theme::text_highlight()));
        }
        if state.ui_state.exports_running > 0 {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled("exporting…", Theme::text_highlight()));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let Some(view) = state.browser.view() else {
            let text = if state.browser.is_loading() {
                "Loading logs…"
            } else {
                "No logs loaded"
            };
            let placeholder = Paragraph::new(Span::styled(text, Theme::text_dim()))
                .alignment(Alignment::Center)
                .block(Self::block(" Logs "));
            frame.render_widget(placeholder, area);
            return;
        };

        if view.is_empty() {
            let empty = Paragraph::new(Span::styled("No matching logs", Theme::text_dim()))
                .alignment(Alignment::Center)
                .block(Self::block(" Logs "));
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(["ID", "Time", "Request", "Decision", "Risks", "Types"])
            .style(Theme::table_header());

        let rows: Vec<Row> = view.logs.iter().map(Self::row).collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(19),
                Constraint::Min(12),
                Constraint::Length(8),
                Constraint::Length(5),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .block(Self::block(" Logs "))
        .row_highlight_style(Theme::row_selected())
        .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut state.ui_state.table_state);
    }

    fn row(entry: &LogEntry) -> Row<'_> {
        let risks_style = match entry.max_severity() {
            Some(severity) => Theme::severity(severity),
            None => Theme::text_dim(),
        };

        Row::new(vec![
            Cell::from(entry.id.to_string()),
            Cell::from(Span::styled(display_time(&entry.timestamp), Theme::text_dim())),
            Cell::from(entry.request_id.as_str()),
            Cell::from(Span::styled(
                entry.decision.as_str(),
                Theme::decision(entry.decision),
            )),
            Cell::from(Span::styled(entry.risk_count().to_string(), risks_style)),
            Cell::from(entry.risk_types().join(",")),
        ])
    }

    fn render_details(frame: &mut Frame, area: Rect, state: &AppState) {
        let lines = match state.selected_entry() {
            None => vec![Line::from(Span::styled("No row selected", Theme::text_dim()))],
            Some(entry) if entry.risks.is_empty() => vec![Line::from(Span::styled(
                format!("{} has no risks", entry.request_id),
                Theme::text_dim(),
            ))],
            Some(entry) => entry
                .risks
                .iter()
                .map(|risk| {
                    Line::from(vec![
                        Span::styled(format!("{:<7}", risk.severity.as_str()), Theme::severity(risk.severity)),
                        Span::styled(format!("{:<18}", risk.risk_type), Theme::text_highlight()),
                        Span::styled(
                            format!("[{}..{}] ", risk.position.start, risk.position.end),
                            Theme::text_dim(),
                        ),
                        Span::styled(format!("{:?} ", risk.matched), Theme::text()),
                        Span::styled(risk.explanation.as_str(), Theme::text_dim()),
                    ])
                })
                .collect(),
        };

        let details = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Self::block(" Risks "));
        frame.render_widget(details, area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let browser = &state.browser;
        let hints = log_table_hints(browser.can_previous(), browser.can_next());

        let mut status = StatusBar::new().hints(hints);
        if let Some(view) = browser.view() {
            status = status.right(position_label(view, browser.page().page_number()));
        }

        frame.render_widget(status, area);
    }
}

/// "Page 2 · 11-20 of 45"
pub fn position_label(view: &PageView, page_number: usize) -> String {
    match view.range() {
        Some((start, end)) => format!("Page {} · {}-{} of {}", page_number, start + 1, end, view.total),
        None => format!("Page {} · 0 of {}", page_number, view.total),
    }
}

/// RFC 3339 timestamps shortened to seconds; anything else shown as received
fn display_time(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwscope_types::Decision;
    use ratatui::{Terminal, backend::TestBackend};

    use crate::app::AppState;
    use fwscope_logs::LogBrowser;
    use fwscope_types::{FilterCriteria, PageState};

    #[test]
    fn test_position_label() {
        let view = PageView {
            logs: vec![LogEntry::new(11, "r", "t", Decision::Allow); 10],
            total: 45,
            limit: 10,
            offset: 10,
            has_more: true,
        };
        assert_eq!(position_label(&view, 2), "Page 2 · 11-20 of 45");

        let empty = PageView {
            total: 45,
            limit: 10,
            offset: 50,
            ..PageView::default()
        };
        assert_eq!(position_label(&empty, 6), "Page 6 · 0 of 45");
    }

    #[test]
    fn test_display_time() {
        assert_eq!(display_time("2024-07-01T08:00:00.123456Z"), "2024-07-01 08:00:00");
        assert_eq!(display_time("yesterday"), "yesterday");
    }

    #[test]
    fn test_renders_placeholder_before_first_load() {
        let mut state = AppState::new(LogBrowser::new(FilterCriteria::new(), PageState::new(10), 1000));
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();

        terminal
            .draw(|frame| LogTableScreen::render(frame, &mut state))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("fwscope"));
        assert!(text.contains("No logs loaded"));
        assert!(text.contains("10 per page"));
    }

    #[test]
    fn test_header_shows_ceiling_in_local_mode() {
        let criteria = FilterCriteria::new().with_risk_type(Some("PII"));
        let mut state = AppState::new(LogBrowser::new(criteria, PageState::new(10), 250));
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();

        terminal
            .draw(|frame| LogTableScreen::render(frame, &mut state))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("local (first 250)"));
    }
}
