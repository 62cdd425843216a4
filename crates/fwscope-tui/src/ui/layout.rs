use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Create the main layout with header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Split the content area into table and optional risk details pane
    pub fn log_table(area: Rect, show_details: bool) -> (Rect, Option<Rect>) {
        if show_details {
            let chunks = RatatuiLayout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Percentage(60), // Table
                    Constraint::Percentage(40), // Details
                ])
                .split(area);
            (chunks[0], Some(chunks[1]))
        } else {
            (area, None)
        }
    }

    /// A rectangle of at most `width` x `height` centered in `area`
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(2));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = Layout::centered(area, 60, 10);
        assert_eq!(popup, Rect::new(20, 15, 60, 10));

        let small = Rect::new(0, 0, 30, 8);
        let popup = Layout::centered(small, 60, 10);
        assert_eq!((popup.width, popup.height), (26, 6));
    }

    #[test]
    fn test_details_split() {
        let area = Rect::new(0, 0, 80, 20);
        assert_eq!(Layout::log_table(area, false), (area, None));

        let (table, details) = Layout::log_table(area, true);
        assert_eq!(table.height + details.map_or(0, |d| d.height), 20);
    }
}
