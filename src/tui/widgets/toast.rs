//! Stacked notifications in the top-right corner.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::feedback::NoticeLevel;
use crate::tui::state::Toast;
use crate::tui::theme::Theme;

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;

pub(crate) fn draw_toasts(area: Rect, f: &mut ratatui::Frame, theme: &Theme, toasts: &[Toast]) {
    let width = TOAST_WIDTH.min(area.width);
    let x = area.x + area.width.saturating_sub(width);

    // Newest on top.
    for (i, toast) in toasts.iter().rev().enumerate() {
        let y = area.y + (i as u16) * TOAST_HEIGHT;
        if y + TOAST_HEIGHT > area.y + area.height {
            break;
        }
        let rect = Rect::new(x, y, width, TOAST_HEIGHT);
        let color = theme.notice_color(toast.notice.level);
        let icon = match toast.notice.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Warning => "⚠",
            NoticeLevel::Error => "✗",
        };

        f.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme.background));
        let body = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{icon} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(toast.notice.text.as_str(), Style::default().fg(theme.text)),
        ]))
        .wrap(Wrap { trim: true })
        .block(block);
        f.render_widget(body, rect);
    }
}
