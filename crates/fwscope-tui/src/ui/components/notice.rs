use ratatui::{
    Frame,
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::Notice;
use crate::ui::{Layout, Theme};

/// Modal message that stays up until acknowledged
pub struct NoticePopup;

impl NoticePopup {
    pub fn render(frame: &mut Frame, notice: &Notice) {
        let popup_area = Layout::centered(frame.area(), 60, 7);
        frame.render_widget(Clear, popup_area);

        let (title, style) = if notice.is_error {
            (" Error ", Theme::error())
        } else {
            (" Done ", Theme::success())
        };

        let text = vec![
            Line::from(Span::styled(notice.message.as_str(), Theme::text())),
            Line::from(""),
            Line::from(Span::styled("[Enter] OK", Theme::text_dim())),
        ];

        let popup = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(style)
                    .title(Span::styled(title, style)),
            );

        frame.render_widget(popup, popup_area);
    }
}
