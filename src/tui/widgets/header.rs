//! Top header bar with title and connection state.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::theme::Theme;

pub(crate) fn draw_header(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    title: &str,
    mode_label: &str,
    offline: Option<&str>,
) {
    let mut spans = vec![
        Span::styled(
            "BFG FEEDBACK",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  //  {title}"), Style::default().fg(theme.text_dim)),
        Span::styled(format!("  [{mode_label}]"), Style::default().fg(theme.muted)),
    ];

    if let Some(message) = offline {
        spans.push(Span::styled(
            format!("  ⚠ {message}"),
            Style::default()
                .fg(theme.caution)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let header_line = Line::from(spans);
    let rule = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(theme.border),
    ));

    f.render_widget(Paragraph::new(vec![header_line, rule]), area);
}
