//! TUI keyboard input handling.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::feedback::{pipeline, MAX_RATING, QUICK_EMOJIS};

use super::state::*;

pub(crate) fn handle_key(
    rt: &tokio::runtime::Runtime,
    app: &mut App,
    key: KeyEvent,
) -> Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
            app.exit = true;
            return Ok(true);
        }
        KeyCode::Esc => {
            if app.form.show_more_emojis() {
                app.form.close_more_emojis();
                clamp_emoji_cursor(app);
                return Ok(false);
            }
            app.exit = true;
            return Ok(true);
        }
        KeyCode::Char('t') if ctrl => {
            if let Err(rejection) = app.form.toggle_dark_mode() {
                app.reject(rejection);
            }
            return Ok(false);
        }
        KeyCode::Char('s') if ctrl => {
            start_submission(rt, app);
            return Ok(false);
        }
        KeyCode::F(5) => {
            start_submission(rt, app);
            return Ok(false);
        }
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return Ok(false);
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return Ok(false);
        }
        _ => {}
    }

    if ctrl {
        return Ok(false);
    }

    match app.focus {
        Focus::Language => handle_language_key(app, key),
        Focus::Comment => handle_comment_key(app, key),
        Focus::Code => handle_code_key(app, key),
        Focus::Emojis => handle_emoji_key(app, key),
        Focus::Rating => handle_rating_key(app, key),
        Focus::Submit => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                start_submission(rt, app);
            }
        }
    }
    Ok(false)
}

fn handle_language_key(app: &mut App, key: KeyEvent) {
    let current = app.form.language();
    match key.code {
        KeyCode::Left | KeyCode::Up => app.select_language(current.prev()),
        KeyCode::Right | KeyCode::Down | KeyCode::Enter | KeyCode::Char(' ') => {
            app.select_language(current.next())
        }
        _ => {}
    }
}

fn handle_comment_key(app: &mut App, key: KeyEvent) {
    let result = match key.code {
        KeyCode::Char(c) => app.form.append_char(c),
        KeyCode::Enter => app.form.append_char('\n'),
        KeyCode::Backspace => app.form.delete_last_char(),
        _ => Ok(()),
    };
    if let Err(rejection) = result {
        app.reject(rejection);
    }
}

fn handle_code_key(app: &mut App, key: KeyEvent) {
    let result = match key.code {
        KeyCode::Char(c) if !c.is_whitespace() => app.form.push_code_char(c),
        KeyCode::Backspace => app.form.pop_code_char(),
        KeyCode::Enter => {
            app.focus = app.focus.next();
            Ok(())
        }
        _ => Ok(()),
    };
    if let Err(rejection) = result {
        app.reject(rejection);
    }
}

fn handle_emoji_key(app: &mut App, key: KeyEvent) {
    let count = app.visible_emojis().len();
    match key.code {
        KeyCode::Left => {
            app.emoji_cursor = if app.emoji_cursor == 0 {
                count.saturating_sub(1)
            } else {
                app.emoji_cursor - 1
            };
        }
        KeyCode::Right => {
            app.emoji_cursor = (app.emoji_cursor + 1) % count.max(1);
        }
        KeyCode::Char('+') => {
            if let Err(rejection) = app.form.toggle_more_emojis() {
                app.reject(rejection);
            }
            clamp_emoji_cursor(app);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            let Some(emoji) = app.visible_emojis().get(app.emoji_cursor).copied() else {
                return;
            };
            if let Err(rejection) = app.form.add_emoji(emoji) {
                app.reject(rejection);
                return;
            }
            // Picking from the extended palette closes it.
            if app.emoji_cursor >= QUICK_EMOJIS.len() {
                app.form.close_more_emojis();
                clamp_emoji_cursor(app);
            }
        }
        _ => {}
    }
}

fn handle_rating_key(app: &mut App, key: KeyEvent) {
    let current = app.form.rating();
    let star = match key.code {
        KeyCode::Left => current.saturating_sub(1),
        KeyCode::Right => (current + 1).min(MAX_RATING),
        KeyCode::Char(c) => match c.to_digit(10) {
            Some(d) if d <= u32::from(MAX_RATING) => d as u8,
            _ => return,
        },
        _ => return,
    };
    if let Err(rejection) = app.form.select_star(star) {
        app.reject(rejection);
    }
}

fn clamp_emoji_cursor(app: &mut App) {
    let count = app.visible_emojis().len();
    if app.emoji_cursor >= count {
        app.emoji_cursor = count.saturating_sub(1);
    }
}

/// Start the pipeline on the runtime; events come back over a channel polled each frame.
pub(crate) fn start_submission(rt: &tokio::runtime::Runtime, app: &mut App) {
    let request = match app.form.begin_submit() {
        Ok(request) => request,
        Err(rejection) => {
            debug!(?rejection, "submission refused");
            app.reject(rejection);
            return;
        }
    };

    let (tx, rx) = mpsc::channel();
    let services = Arc::clone(&app.services);
    rt.spawn(async move {
        let stage_tx = tx.clone();
        let outcome = pipeline::run_pipeline(services.as_ref(), &request, move |stage| {
            let _ = stage_tx.send(PipelineEvent::Stage(stage));
        })
        .await;
        let _ = tx.send(PipelineEvent::Finished(outcome));
    });

    app.pipeline = Some(PipelineState {
        started_at: Instant::now(),
        rx,
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::connectivity::ConnectivityMonitor;
    use crate::feedback::pipeline::tests::{MockServices, Reply};
    use crate::feedback::{NoticeLevel, MAX_COMMENT_CHARS, MORE_EMOJIS};
    use crate::i18n::{Language, Localizer};
    use crate::tui::state::tests::test_app;

    fn press(rt: &tokio::runtime::Runtime, app: &mut App, code: KeyCode) -> bool {
        handle_key(rt, app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn press_ctrl(rt: &tokio::runtime::Runtime, app: &mut App, c: char) -> bool {
        handle_key(rt, app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)).unwrap()
    }

    fn type_text(rt: &tokio::runtime::Runtime, app: &mut App, text: &str) {
        for c in text.chars() {
            press(rt, app, KeyCode::Char(c));
        }
    }

    fn wait_for_outcome(app: &mut App) {
        for _ in 0..200 {
            if app.poll_pipeline() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("pipeline did not finish");
    }

    #[test]
    fn test_typing_and_backspace_edit_comment() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app();
        assert_eq!(app.focus, Focus::Comment);

        type_text(&rt, &mut app, "Bon");
        press(&rt, &mut app, KeyCode::Enter);
        type_text(&rt, &mut app, "ok");
        press(&rt, &mut app, KeyCode::Backspace);
        assert_eq!(app.form.comment(), "Bon\no");
    }

    #[test]
    fn test_typing_past_limit_raises_toast() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app();
        app.form.set_comment("a".repeat(MAX_COMMENT_CHARS)).unwrap();

        press(&rt, &mut app, KeyCode::Char('b'));
        assert_eq!(app.form.draft().comment_len(), MAX_COMMENT_CHARS);
        assert_eq!(app.toasts.len(), 1);
        assert_eq!(app.toasts[0].notice.level, NoticeLevel::Error);
    }

    #[test]
    fn test_language_and_rating_keys() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app();

        press(&rt, &mut app, KeyCode::BackTab);
        assert_eq!(app.focus, Focus::Language);
        press(&rt, &mut app, KeyCode::Right);
        assert_eq!(app.form.language(), Language::Fr.next());
        assert_eq!(app.l10n.language(), app.form.language());

        app.focus = Focus::Rating;
        press(&rt, &mut app, KeyCode::Char('4'));
        assert_eq!(app.form.rating(), 4);
        press(&rt, &mut app, KeyCode::Right);
        press(&rt, &mut app, KeyCode::Right);
        assert_eq!(app.form.rating(), MAX_RATING);
        press(&rt, &mut app, KeyCode::Char('9'));
        assert_eq!(app.form.rating(), MAX_RATING);
        press(&rt, &mut app, KeyCode::Char('0'));
        assert_eq!(app.form.rating(), 0);
    }

    #[test]
    fn test_extended_palette_closes_after_pick() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app();
        app.focus = Focus::Emojis;

        press(&rt, &mut app, KeyCode::Char('+'));
        assert!(app.form.show_more_emojis());
        for _ in 0..QUICK_EMOJIS.len() {
            press(&rt, &mut app, KeyCode::Right);
        }
        press(&rt, &mut app, KeyCode::Enter);

        assert_eq!(app.form.comment(), MORE_EMOJIS[0]);
        assert!(!app.form.show_more_emojis());
        assert!(app.emoji_cursor < QUICK_EMOJIS.len());
    }

    #[test]
    fn test_theme_toggle_and_quit() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app();

        assert!(!app.form.dark_mode());
        assert!(!press_ctrl(&rt, &mut app, 't'));
        assert!(app.form.dark_mode());

        assert!(press(&rt, &mut app, KeyCode::Esc));
        assert!(app.exit);
    }

    #[test]
    fn test_submit_runs_pipeline_and_resets_form() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app();
        type_text(&rt, &mut app, "Super");
        app.focus = Focus::Submit;

        press(&rt, &mut app, KeyCode::Enter);
        assert!(app.form.is_submitting());

        // Edits and a second submit are refused while the first one is running.
        press_ctrl(&rt, &mut app, 's');
        app.focus = Focus::Comment;
        press(&rt, &mut app, KeyCode::Char('!'));

        wait_for_outcome(&mut app);
        assert!(!app.form.is_submitting());
        assert_eq!(app.form.comment(), "");
        assert_eq!(app.toasts.last().unwrap().notice.level, NoticeLevel::Success);
    }

    #[test]
    fn test_theme_toggle_ignored_during_submission() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app();
        type_text(&rt, &mut app, "Super");

        press(&rt, &mut app, KeyCode::F(5));
        assert!(app.form.is_submitting());
        press_ctrl(&rt, &mut app, 't');
        assert!(!app.form.dark_mode());
        assert!(app.toasts.is_empty());

        wait_for_outcome(&mut app);
        press_ctrl(&rt, &mut app, 't');
        assert!(app.form.dark_mode());
    }

    #[test]
    fn test_failed_submission_keeps_draft() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = App::new(
            Arc::new(MockServices::new(Reply::Status(404), Reply::Ok, Reply::Ok)),
            ConnectivityMonitor::disabled(),
            Localizer::new(Language::En),
            true,
        );
        type_text(&rt, &mut app, "Hello");
        app.focus = Focus::Code;
        type_text(&rt, &mut app, "BAD 1");
        assert_eq!(app.form.unique_code(), "BAD1");

        press(&rt, &mut app, KeyCode::F(5));
        wait_for_outcome(&mut app);

        assert_eq!(app.form.comment(), "Hello");
        assert_eq!(app.form.unique_code(), "BAD1");
        assert_eq!(app.toasts.last().unwrap().notice.level, NoticeLevel::Error);
    }

    #[test]
    fn test_empty_form_submit_shows_notice() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app();
        press(&rt, &mut app, KeyCode::F(5));
        assert!(app.pipeline.is_none());
        assert_eq!(app.toasts.len(), 1);
    }
}
