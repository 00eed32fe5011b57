//! Fullscreen terminal UI (TUI) for the feedback form.

pub(crate) mod animation;
pub(crate) mod input;
pub(crate) mod screens;
pub(crate) mod state;
pub(crate) mod theme;
pub(crate) mod widgets;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Terminal;
use tracing::info;

use crate::connectivity::ConnectivityMonitor;
use crate::feedback::pipeline::FeedbackServices;
use crate::i18n::{Localizer, MessageKey};
use state::App;
use theme::Theme;

const FRAME_TIME: Duration = Duration::from_millis(16);

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

pub(crate) fn run_tui(
    rt: &tokio::runtime::Runtime,
    services: Arc<dyn FeedbackServices>,
    connectivity: ConnectivityMonitor,
    l10n: Localizer,
    dark_mode: bool,
) -> Result<()> {
    let _guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(services, connectivity, l10n, dark_mode);
    info!(language = %app.form.language(), "feedback form opened");

    loop {
        app.poll_pipeline();
        app.poll_connectivity();
        app.prune_toasts(Instant::now());

        terminal.draw(|f| draw(f.area(), f, &app))?;

        let timeout = FRAME_TIME.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && input::handle_key(rt, &mut app, key)? {
                    break;
                }
            }
        }

        if app.last_tick.elapsed() >= FRAME_TIME {
            app.last_tick = Instant::now();
            app.animation.advance();
        }
    }

    if app.form.is_submitting() {
        info!("closing while a submission is still in flight");
    }
    Ok(())
}

fn draw(area: Rect, f: &mut ratatui::Frame, app: &App) {
    let theme = Theme::for_mode(app.form.dark_mode());

    f.render_widget(
        Block::default().style(Style::default().bg(theme.background).fg(theme.text)),
        area,
    );

    let outer_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(0),    // content
        ])
        .split(area);

    let mode_label = if app.form.dark_mode() {
        app.l10n.t(MessageKey::DarkMode)
    } else {
        app.l10n.t(MessageKey::LightMode)
    };
    let offline = (!app.form.is_online()).then(|| app.l10n.t(MessageKey::OfflineMessage));
    widgets::header::draw_header(
        outer_layout[0],
        f,
        &theme,
        app.l10n.t(MessageKey::Title),
        mode_label,
        offline,
    );

    screens::form::draw_form(outer_layout[1], f, app, &theme);
    widgets::toast::draw_toasts(outer_layout[1], f, &theme, &app.toasts);
}
