//! Feedback form state and wire types.
//!
//! Goals:
//! - Keep every piece of mutable form state in one place (`FeedbackForm`) so the terminal UI,
//!   the prompt flow and the one-shot `submit` command behave identically.
//! - Enforce the comment length cap as a soft guard: rejected edits leave the draft untouched
//!   and return a `FormRejection` the caller turns into a notice.
//! - Hand the submission pipeline an immutable snapshot, never the live draft.

use serde::{Deserialize, Serialize};

use crate::i18n::{Language, Localizer, MessageKey};
use crate::idempotency;

pub(crate) mod cli;
pub(crate) mod pipeline;

pub(crate) use pipeline::{PipelineOutcome, PipelineStage};

pub(crate) const MAX_COMMENT_CHARS: usize = 500;

/// Code that stands for "anonymous" and skips remote validation.
pub(crate) const ANONYMOUS_CODE: &str = "BLFLGE";

pub(crate) const MAX_RATING: u8 = 5;

pub(crate) const QUICK_EMOJIS: [&str; 4] = ["😄", "😡", "😐", "❤️"];

pub(crate) const MORE_EMOJIS: [&str; 12] = [
    "😂", "😣", "🤔", "😍", "💖", "💕", "😮", "😲", "😢", "😔", "🙏", "😊",
];

pub(crate) fn char_count(text: &str) -> usize {
    text.chars().count()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FeedbackDraft {
    pub language: Language,
    pub comment: String,
    pub rating: u8,
    pub unique_code: String,
}

impl FeedbackDraft {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn comment_len(&self) -> usize {
        char_count(&self.comment)
    }

    pub fn is_too_long(&self) -> bool {
        self.comment_len() > MAX_COMMENT_CHARS
    }

    pub fn is_empty(&self) -> bool {
        self.comment.is_empty() && self.rating == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmissionState {
    Idle,
    Submitting(PipelineStage),
}

/// Why an edit or a submit attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormRejection {
    /// A submission is in flight; the form is read-only until it finishes.
    Busy,
    CommentTooLong,
    CharLimitReached,
    NothingToSubmit,
}

impl FormRejection {
    /// Notice text for the rejection, or `None` when it should be silent.
    pub(crate) fn notice(self, l10n: &Localizer) -> Option<Notice> {
        let key = match self {
            FormRejection::Busy => return None,
            FormRejection::CommentTooLong => MessageKey::CommentTooLong,
            FormRejection::CharLimitReached => MessageKey::CharLimitReached,
            FormRejection::NothingToSubmit => MessageKey::NothingToSubmit,
        };
        Some(Notice::error(l10n.t(key)))
    }
}

/// Snapshot of the draft taken when a submission starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubmissionRequest {
    pub language: Language,
    pub comment: String,
    pub rating: u8,
    pub unique_code: String,
    pub idempotency_key: String,
}

impl SubmissionRequest {
    pub fn requires_code_check(&self) -> bool {
        let code = self.unique_code.as_str();
        !(code.is_empty() || code == ANONYMOUS_CODE)
    }

    pub fn code_or_anonymous(&self) -> &str {
        if self.unique_code.is_empty() {
            ANONYMOUS_CODE
        } else {
            &self.unique_code
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CodeValidationRequest<'a> {
    #[serde(rename = "uniqueCode")]
    pub unique_code: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnalysisRequest<'a> {
    pub comment: &'a str,
}

/// Body returned by the sentiment service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AnalysisResult {
    #[serde(default)]
    pub comment: Option<String>,
    pub sentiment: serde_json::Value,
}

impl AnalysisResult {
    /// A usable analysis carries a non-null `sentiment`.
    pub fn has_sentiment(&self) -> bool {
        !self.sentiment.is_null()
    }

    pub fn sentiment_label(&self) -> String {
        match &self.sentiment {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "unknown".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FeedbackRecord {
    pub language: Language,
    pub comment: String,
    pub rating: u8,
    #[serde(rename = "uniqueCode")]
    pub unique_code: String,
    pub sentiment: serde_json::Value,
}

impl FeedbackRecord {
    pub fn from_analysis(request: &SubmissionRequest, analysis: AnalysisResult) -> Self {
        Self {
            language: request.language,
            comment: analysis
                .comment
                .unwrap_or_else(|| request.comment.clone()),
            rating: request.rating,
            unique_code: request.code_or_anonymous().to_string(),
            sentiment: analysis.sentiment,
        }
    }
}

/// Whatever the persistence API sends back on success; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SubmitReceipt {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NoticeLevel {
    Success,
    Error,
    Warning,
}

/// A transient, user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }
}

/// Owns the draft plus the submission and display flags.
#[derive(Debug, Clone)]
pub(crate) struct FeedbackForm {
    draft: FeedbackDraft,
    submission: SubmissionState,
    dark_mode: bool,
    online: bool,
    show_more_emojis: bool,
}

impl FeedbackForm {
    pub fn new(language: Language) -> Self {
        Self {
            draft: FeedbackDraft::new(language),
            submission: SubmissionState::Idle,
            dark_mode: false,
            online: true,
            show_more_emojis: false,
        }
    }

    pub fn draft(&self) -> &FeedbackDraft {
        &self.draft
    }

    pub fn language(&self) -> Language {
        self.draft.language
    }

    pub fn comment(&self) -> &str {
        &self.draft.comment
    }

    pub fn rating(&self) -> u8 {
        self.draft.rating
    }

    pub fn unique_code(&self) -> &str {
        &self.draft.unique_code
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.submission, SubmissionState::Submitting(_))
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn show_more_emojis(&self) -> bool {
        self.show_more_emojis
    }

    fn ensure_editable(&self) -> Result<(), FormRejection> {
        if self.is_submitting() {
            Err(FormRejection::Busy)
        } else {
            Ok(())
        }
    }

    pub fn set_language(&mut self, language: Language) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.draft.language = language;
        Ok(())
    }

    /// Replace the whole comment. Over-long text is kept so the counter can flag it;
    /// `begin_submit` refuses it.
    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.draft.comment = comment.into();
        Ok(())
    }

    pub fn append_text(&mut self, fragment: &str) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        if self.draft.comment_len() + char_count(fragment) > MAX_COMMENT_CHARS {
            return Err(FormRejection::CharLimitReached);
        }
        self.draft.comment.push_str(fragment);
        Ok(())
    }

    pub fn append_char(&mut self, c: char) -> Result<(), FormRejection> {
        let mut buf = [0u8; 4];
        self.append_text(c.encode_utf8(&mut buf))
    }

    pub fn add_emoji(&mut self, emoji: &str) -> Result<(), FormRejection> {
        self.append_text(emoji)
    }

    pub fn delete_last_char(&mut self) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.draft.comment.pop();
        Ok(())
    }

    pub fn select_star(&mut self, star: u8) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.draft.rating = star.min(MAX_RATING);
        Ok(())
    }

    pub fn set_unique_code(&mut self, code: impl Into<String>) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.draft.unique_code = code.into();
        Ok(())
    }

    pub fn push_code_char(&mut self, c: char) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.draft.unique_code.push(c);
        Ok(())
    }

    pub fn pop_code_char(&mut self) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.draft.unique_code.pop();
        Ok(())
    }

    pub fn toggle_dark_mode(&mut self) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.dark_mode = !self.dark_mode;
        Ok(())
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn toggle_more_emojis(&mut self) -> Result<(), FormRejection> {
        self.ensure_editable()?;
        self.show_more_emojis = !self.show_more_emojis;
        Ok(())
    }

    pub fn close_more_emojis(&mut self) {
        self.show_more_emojis = false;
    }

    pub fn can_submit(&self) -> bool {
        !self.draft.is_too_long() && !self.draft.is_empty() && !self.is_submitting()
    }

    /// Start a submission: checks run before any state transition, then the form moves to
    /// `Submitting(ValidatingCode)` and the caller gets the snapshot to run the pipeline on.
    pub fn begin_submit(&mut self) -> Result<SubmissionRequest, FormRejection> {
        self.ensure_editable()?;
        if self.draft.is_too_long() {
            return Err(FormRejection::CommentTooLong);
        }
        if self.draft.is_empty() {
            return Err(FormRejection::NothingToSubmit);
        }

        self.submission = SubmissionState::Submitting(PipelineStage::ValidatingCode);
        Ok(SubmissionRequest {
            language: self.draft.language,
            comment: self.draft.comment.clone(),
            rating: self.draft.rating,
            unique_code: self.draft.unique_code.clone(),
            idempotency_key: idempotency::new_submission_key(),
        })
    }

    pub fn advance(&mut self, stage: PipelineStage) {
        if self.is_submitting() {
            self.submission = SubmissionState::Submitting(stage);
        }
    }

    /// Always returns to `Idle`; a saved submission also clears comment, rating and code.
    pub fn finish_submit(&mut self, outcome: &PipelineOutcome) {
        self.submission = SubmissionState::Idle;
        if outcome.is_success() {
            self.draft.comment.clear();
            self.draft.rating = 0;
            self.draft.unique_code.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> FeedbackForm {
        let mut form = FeedbackForm::new(Language::En);
        form.set_comment("Great service").unwrap();
        form.select_star(5).unwrap();
        form
    }

    #[test]
    fn test_append_over_limit_keeps_prior_comment() {
        let mut form = FeedbackForm::new(Language::Fr);
        let base = "a".repeat(499);
        form.set_comment(base.clone()).unwrap();

        assert_eq!(form.append_text("bc"), Err(FormRejection::CharLimitReached));
        assert_eq!(form.comment(), base);

        assert_eq!(form.append_char('b'), Ok(()));
        assert_eq!(form.draft().comment_len(), 500);
        assert_eq!(form.append_char('c'), Err(FormRejection::CharLimitReached));
        assert_eq!(form.draft().comment_len(), 500);
    }

    #[test]
    fn test_emoji_counts_as_characters() {
        let mut form = FeedbackForm::new(Language::Fr);
        form.set_comment("x".repeat(499)).unwrap();
        // ❤️ is a heart plus a variation selector
        assert_eq!(form.add_emoji("❤️"), Err(FormRejection::CharLimitReached));
        assert_eq!(form.add_emoji("😄"), Ok(()));
        assert_eq!(form.draft().comment_len(), 500);
    }

    #[test]
    fn test_select_star_is_clamped() {
        let mut form = FeedbackForm::new(Language::Fr);
        form.select_star(9).unwrap();
        assert_eq!(form.rating(), 5);
        form.select_star(0).unwrap();
        assert_eq!(form.rating(), 0);
    }

    #[test]
    fn test_too_long_comment_never_starts_submission() {
        let mut form = FeedbackForm::new(Language::Fr);
        form.set_comment("z".repeat(501)).unwrap();
        assert!(!form.can_submit());
        assert_eq!(form.begin_submit(), Err(FormRejection::CommentTooLong));
        assert_eq!(form.submission(), SubmissionState::Idle);
    }

    #[test]
    fn test_empty_draft_is_not_submittable() {
        let mut form = FeedbackForm::new(Language::Fr);
        assert!(!form.can_submit());
        assert_eq!(form.begin_submit(), Err(FormRejection::NothingToSubmit));

        form.select_star(3).unwrap();
        assert!(form.can_submit());
    }

    #[test]
    fn test_second_submit_while_submitting_is_rejected() {
        let mut form = filled_form();
        let request = form.begin_submit().unwrap();
        assert_eq!(request.comment, "Great service");
        assert_eq!(
            form.submission(),
            SubmissionState::Submitting(PipelineStage::ValidatingCode)
        );

        assert_eq!(form.begin_submit(), Err(FormRejection::Busy));
        assert_eq!(form.set_comment("changed"), Err(FormRejection::Busy));
        assert_eq!(form.select_star(1), Err(FormRejection::Busy));
        assert_eq!(form.comment(), "Great service");
        assert!(FormRejection::Busy.notice(&Localizer::default()).is_none());
    }

    #[test]
    fn test_exactly_max_chars_is_not_over_limit() {
        let mut form = FeedbackForm::new(Language::Fr);
        form.set_comment("é".repeat(MAX_COMMENT_CHARS)).unwrap();
        assert!(!form.draft().is_too_long());
        assert_eq!(form.append_char('x'), Err(FormRejection::CharLimitReached));

        form.set_comment("é".repeat(MAX_COMMENT_CHARS + 1)).unwrap();
        assert!(form.draft().is_too_long());
    }

    #[test]
    fn test_theme_toggle_is_locked_while_submitting() {
        let mut form = filled_form();
        assert_eq!(form.toggle_dark_mode(), Ok(()));
        assert!(form.dark_mode());

        form.begin_submit().unwrap();
        assert_eq!(form.toggle_dark_mode(), Err(FormRejection::Busy));
        assert!(form.dark_mode());

        form.finish_submit(&PipelineOutcome::InvalidCode);
        assert_eq!(form.toggle_dark_mode(), Ok(()));
        assert!(!form.dark_mode());
    }

    #[test]
    fn test_success_resets_fields_but_keeps_language() {
        let mut form = filled_form();
        form.set_unique_code("XYZ123").unwrap();
        form.begin_submit().unwrap();
        form.advance(PipelineStage::Persisting);

        form.finish_submit(&PipelineOutcome::Saved {
            sentiment: "positive".to_string(),
            message: None,
        });

        assert_eq!(form.submission(), SubmissionState::Idle);
        assert_eq!(form.comment(), "");
        assert_eq!(form.rating(), 0);
        assert_eq!(form.unique_code(), "");
        assert_eq!(form.language(), Language::En);
    }

    #[test]
    fn test_failure_returns_to_idle_and_keeps_draft() {
        let mut form = filled_form();
        form.set_unique_code("XYZ123").unwrap();
        form.begin_submit().unwrap();

        form.finish_submit(&PipelineOutcome::InvalidCode);

        assert_eq!(form.submission(), SubmissionState::Idle);
        assert_eq!(form.comment(), "Great service");
        assert_eq!(form.rating(), 5);
        assert_eq!(form.unique_code(), "XYZ123");
    }

    #[test]
    fn test_advance_is_ignored_when_idle() {
        let mut form = filled_form();
        form.advance(PipelineStage::Analyzing);
        assert_eq!(form.submission(), SubmissionState::Idle);
    }

    #[test]
    fn test_record_uses_sentinel_and_analyzed_comment() {
        let request = SubmissionRequest {
            language: Language::Du,
            comment: "raw".to_string(),
            rating: 4,
            unique_code: String::new(),
            idempotency_key: "k".to_string(),
        };
        assert!(!request.requires_code_check());

        let record = FeedbackRecord::from_analysis(
            &request,
            AnalysisResult {
                comment: Some("normalized".to_string()),
                sentiment: serde_json::json!("neutral"),
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "language": "du",
                "comment": "normalized",
                "rating": 4,
                "uniqueCode": "BLFLGE",
                "sentiment": "neutral"
            })
        );
    }
}
