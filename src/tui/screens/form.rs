//! Feedback form screen drawing.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::feedback::{SubmissionState, MAX_COMMENT_CHARS, MAX_RATING, QUICK_EMOJIS};
use crate::i18n::{Language, MessageKey};
use crate::tui::state::{App, Focus};
use crate::tui::theme::Theme;
use crate::tui::widgets::footer::draw_footer;

const CARET: &str = "▏";

fn field_block(title: &str, focused: bool, theme: &Theme) -> Block<'static> {
    let border = if focused { theme.accent } else { theme.border };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(if focused { theme.accent } else { theme.text_dim }),
        ))
}

pub(crate) fn draw_form(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let palette_height = if app.form.show_more_emojis() { 3 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),              // language
            Constraint::Min(6),                 // comment
            Constraint::Length(3),              // unique code
            Constraint::Length(3),              // quick emojis
            Constraint::Length(palette_height), // extended palette
            Constraint::Length(3),              // rating
            Constraint::Length(3),              // submit
            Constraint::Length(1),              // footer
        ])
        .split(area);

    draw_language(layout[0], f, app, theme);
    draw_comment(layout[1], f, app, theme);
    draw_code(layout[2], f, app, theme);
    draw_emojis(layout[3], layout[4], f, app, theme);
    draw_rating(layout[5], f, app, theme);
    draw_submit(layout[6], f, app, theme);

    let t = |key: MessageKey| app.l10n.t(key);
    let hints: Vec<(&str, &str)> = match app.focus {
        Focus::Language => vec![
            ("◄/►", t(MessageKey::KeyLanguage)),
            ("Tab", t(MessageKey::KeyNext)),
            ("Ctrl+T", t(MessageKey::KeyTheme)),
            ("Esc", t(MessageKey::KeyQuit)),
        ],
        Focus::Comment => vec![
            ("Type", t(MessageKey::KeyEdit)),
            ("Enter", t(MessageKey::KeyNewLine)),
            ("Tab", t(MessageKey::KeyNext)),
            ("F5", t(MessageKey::Submit)),
        ],
        Focus::Code => vec![
            ("Type", t(MessageKey::KeyEdit)),
            ("Tab", t(MessageKey::KeyNext)),
            ("F5", t(MessageKey::Submit)),
        ],
        Focus::Emojis => vec![
            ("◄/►", t(MessageKey::KeyPick)),
            ("Enter", t(MessageKey::KeyInsert)),
            ("+", t(MessageKey::KeyMore)),
            ("Tab", t(MessageKey::KeyNext)),
        ],
        Focus::Rating => vec![
            ("◄/►", t(MessageKey::KeyStars)),
            ("0-5", t(MessageKey::KeySet)),
            ("Tab", t(MessageKey::KeyNext)),
        ],
        Focus::Submit => vec![
            ("Enter", t(MessageKey::Submit)),
            ("Tab", t(MessageKey::KeyNext)),
            ("Esc", t(MessageKey::KeyQuit)),
        ],
    };
    draw_footer(layout[7], f, theme, &hints);
}

fn draw_language(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let focused = app.focus == Focus::Language;
    let current = app.form.language();

    let mut spans = Vec::new();
    for (i, language) in Language::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Style::default()));
        }
        if *language == current {
            spans.push(Span::styled(
                format!("[{}]", language.display_name()),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                format!(" {} ", language.display_name()),
                Style::default().fg(theme.text_dim),
            ));
        }
    }

    let block = field_block(app.l10n.t(MessageKey::SelectLanguage), focused, theme);
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_comment(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let focused = app.focus == Focus::Comment;
    let comment = app.form.comment();
    let len = app.form.draft().comment_len();
    let color = theme.counter_color(len);

    let mut counter = vec![Span::styled(
        format!(" {len}/{MAX_COMMENT_CHARS} "),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if app.form.draft().is_too_long() {
        counter.push(Span::styled(
            format!("{} ", app.l10n.t(MessageKey::LimitReached)),
            Style::default().fg(theme.critical),
        ));
    }

    let block = field_block(app.l10n.t(MessageKey::Comment), focused, theme)
        .title_bottom(Line::from(counter).alignment(Alignment::Right));

    let editing = focused && !app.form.is_submitting();
    let text = if comment.is_empty() && !editing {
        Text::from(Span::styled(
            app.l10n.t(MessageKey::Placeholder),
            Style::default().fg(theme.muted),
        ))
    } else {
        let mut lines: Vec<Line> = comment
            .split('\n')
            .map(|line| {
                Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(theme.text),
                ))
            })
            .collect();
        if editing {
            if let Some(last) = lines.last_mut() {
                last.spans
                    .push(Span::styled(CARET, Style::default().fg(theme.accent)));
            }
        }
        Text::from(lines)
    };

    f.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

fn draw_code(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let focused = app.focus == Focus::Code;
    let code = app.form.unique_code();

    let mut spans = if code.is_empty() {
        vec![Span::styled(
            app.l10n.t(MessageKey::CodePlaceholder),
            Style::default().fg(theme.muted),
        )]
    } else {
        vec![Span::styled(
            code.to_string(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )]
    };
    if focused && !app.form.is_submitting() {
        spans.insert(0, Span::styled(CARET, Style::default().fg(theme.accent)));
    }

    let block = field_block(app.l10n.t(MessageKey::UniqueCode), focused, theme);
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn emoji_spans<'a>(
    emojis: &[&'a str],
    offset: usize,
    app: &App,
    theme: &Theme,
) -> Vec<Span<'a>> {
    let focused = app.focus == Focus::Emojis;
    emojis
        .iter()
        .enumerate()
        .map(|(i, emoji)| {
            let selected = focused && app.emoji_cursor == offset + i;
            let style = if selected {
                Style::default()
                    .bg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Span::styled(format!(" {emoji} "), style)
        })
        .collect()
}

fn draw_emojis(
    quick_area: Rect,
    palette_area: Rect,
    f: &mut ratatui::Frame,
    app: &App,
    theme: &Theme,
) {
    let focused = app.focus == Focus::Emojis;
    let emojis = app.visible_emojis();

    let mut quick = emoji_spans(&emojis[..QUICK_EMOJIS.len()], 0, app, theme);
    let toggle = if app.form.show_more_emojis() { "−" } else { "+" };
    quick.push(Span::styled(
        format!("   {toggle} {}", app.l10n.t(MessageKey::MoreEmojis)),
        Style::default().fg(theme.muted),
    ));
    let block = field_block(app.l10n.t(MessageKey::Emoji), focused, theme);
    f.render_widget(Paragraph::new(Line::from(quick)).block(block), quick_area);

    if app.form.show_more_emojis() && palette_area.height > 0 {
        let more = emoji_spans(&emojis[QUICK_EMOJIS.len()..], QUICK_EMOJIS.len(), app, theme);
        let block = field_block(app.l10n.t(MessageKey::MoreEmojis), focused, theme);
        f.render_widget(Paragraph::new(Line::from(more)).block(block), palette_area);
    }
}

fn draw_rating(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let focused = app.focus == Focus::Rating;
    let rating = app.form.rating();

    let mut spans: Vec<Span> = (1..=MAX_RATING)
        .map(|star| {
            if star <= rating {
                Span::styled("★ ", Style::default().fg(theme.star))
            } else {
                Span::styled("☆ ", Style::default().fg(theme.muted))
            }
        })
        .collect();
    spans.push(Span::styled(
        format!("  {rating} {}", app.l10n.t(MessageKey::Star)),
        Style::default().fg(theme.text_dim),
    ));

    let block = field_block(app.l10n.t(MessageKey::Rating), focused, theme);
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_submit(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let focused = app.focus == Focus::Submit;

    let line = match app.form.submission() {
        SubmissionState::Submitting(stage) => Line::from(vec![
            Span::styled(
                format!("{} ", app.animation.spinner_char()),
                Style::default().fg(theme.accent),
            ),
            Span::styled(
                app.l10n.t(MessageKey::Submitting),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({})", app.l10n.t(stage.message_key())),
                Style::default().fg(theme.muted),
            ),
        ]),
        SubmissionState::Idle => {
            let color = if app.form.can_submit() {
                theme.accent
            } else {
                theme.muted
            };
            let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
            if focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(
                format!("  {}  ", app.l10n.t(MessageKey::Submit)),
                style,
            ))
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused { theme.accent } else { theme.border }));
    f.render_widget(
        Paragraph::new(line.alignment(Alignment::Center)).block(block),
        area,
    );
}
