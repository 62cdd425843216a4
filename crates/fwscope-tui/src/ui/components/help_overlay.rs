use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::centered(frame.area(), 50, 27);
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Table"),
            Self::key_line("j/↓", "Select next row"),
            Self::key_line("k/↑", "Select previous row"),
            Self::key_line("Enter", "Toggle risk details"),
            Line::from(""),
            Self::section("Paging"),
            Self::key_line("n/→", "Next page"),
            Self::key_line("p/←", "Previous page"),
            Self::key_line("g", "First page"),
            Self::key_line("+/-", "Page size"),
            Line::from(""),
            Self::section("Filters"),
            Self::key_line("t/T", "Cycle risk type"),
            Self::key_line("s", "Cycle severity"),
            Self::key_line("c", "Clear type and severity"),
            Self::key_line("r", "Reload"),
            Line::from(""),
            Self::section("Export"),
            Self::key_line("e", "Export CSV"),
            Self::key_line("E", "Export JSON"),
            Line::from(""),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("Esc", "Close"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(name: &str) -> Line<'_> {
        Line::from(Span::styled(name, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
