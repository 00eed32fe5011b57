//! TUI application state types.

use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use super::animation::AnimationState;
use crate::connectivity::ConnectivityMonitor;
use crate::feedback::pipeline::FeedbackServices;
use crate::feedback::{
    FeedbackForm, FormRejection, Notice, PipelineOutcome, PipelineStage, MORE_EMOJIS,
    QUICK_EMOJIS,
};
use crate::i18n::{Language, Localizer, MessageKey};

pub(crate) const TOAST_TTL: Duration = Duration::from_secs(3);
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Language,
    Comment,
    Code,
    Emojis,
    Rating,
    Submit,
}

impl Focus {
    pub const ALL: [Focus; 6] = [
        Focus::Language,
        Focus::Comment,
        Focus::Code,
        Focus::Emojis,
        Focus::Rating,
        Focus::Submit,
    ];

    fn index(self) -> usize {
        Focus::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Focus {
        Focus::ALL[(self.index() + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = self.index();
        let prev = if idx == 0 {
            Focus::ALL.len() - 1
        } else {
            idx - 1
        };
        Focus::ALL[prev]
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Toast {
    pub notice: Notice,
    pub created_at: Instant,
}

#[derive(Debug)]
pub(crate) enum PipelineEvent {
    Stage(PipelineStage),
    Finished(PipelineOutcome),
}

#[derive(Debug)]
pub(crate) struct PipelineState {
    pub started_at: Instant,
    pub rx: mpsc::Receiver<PipelineEvent>,
}

pub(crate) struct App {
    pub form: FeedbackForm,
    pub l10n: Localizer,
    pub focus: Focus,
    pub emoji_cursor: usize,
    pub toasts: Vec<Toast>,
    pub services: Arc<dyn FeedbackServices>,
    pub pipeline: Option<PipelineState>,
    pub connectivity: ConnectivityMonitor,
    pub exit: bool,
    pub last_tick: Instant,
    pub animation: AnimationState,
}

impl App {
    pub fn new(
        services: Arc<dyn FeedbackServices>,
        connectivity: ConnectivityMonitor,
        l10n: Localizer,
        dark_mode: bool,
    ) -> Self {
        let mut form = FeedbackForm::new(l10n.language());
        form.set_dark_mode(dark_mode);

        Self {
            form,
            l10n,
            focus: Focus::Comment,
            emoji_cursor: 0,
            toasts: Vec::new(),
            services,
            pipeline: None,
            connectivity,
            exit: false,
            last_tick: Instant::now(),
            animation: AnimationState::new(),
        }
    }

    /// Emojis currently on screen: the quick row, plus the extended palette when open.
    pub fn visible_emojis(&self) -> Vec<&'static str> {
        let mut emojis = QUICK_EMOJIS.to_vec();
        if self.form.show_more_emojis() {
            emojis.extend_from_slice(&MORE_EMOJIS);
        }
        emojis
    }

    pub fn select_language(&mut self, language: Language) {
        if self.form.set_language(language).is_ok() {
            self.l10n.set_language(language);
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.toasts.push(Toast {
            notice,
            created_at: Instant::now(),
        });
        if self.toasts.len() > MAX_TOASTS {
            let overflow = self.toasts.len() - MAX_TOASTS;
            self.toasts.drain(..overflow);
        }
    }

    pub fn reject(&mut self, rejection: FormRejection) {
        if let Some(notice) = rejection.notice(&self.l10n) {
            self.notify(notice);
        }
    }

    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created_at) < TOAST_TTL);
    }

    pub fn poll_connectivity(&mut self) {
        if let Some(online) = self.connectivity.poll() {
            self.form.set_online(online);
            if online {
                info!("back online");
            } else {
                self.notify(Notice::warning(self.l10n.t(MessageKey::OfflineMessage)));
            }
        }
    }

    /// Drain pipeline events; returns true when a submission finished this call.
    pub fn poll_pipeline(&mut self) -> bool {
        let Some(state) = self.pipeline.as_ref() else {
            return false;
        };

        let mut finished = None;
        loop {
            match state.rx.try_recv() {
                Ok(PipelineEvent::Stage(stage)) => self.form.advance(stage),
                Ok(PipelineEvent::Finished(outcome)) => {
                    finished = Some(outcome);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("submission worker stopped without an outcome");
                    finished = Some(PipelineOutcome::NetworkFailed {
                        reason: "submission worker stopped unexpectedly".to_string(),
                    });
                    break;
                }
            }
        }

        match finished {
            Some(outcome) => {
                if let Some(state) = self.pipeline.take() {
                    info!(
                        elapsed_ms = state.started_at.elapsed().as_millis() as u64,
                        success = outcome.is_success(),
                        "submission finished"
                    );
                }
                self.form.finish_submit(&outcome);
                self.notify(outcome.notice(&self.l10n));
                true
            }
            None => false,
        }
    }
}
