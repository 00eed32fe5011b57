//! Submission pipeline: code check, sentiment analysis, persistence.
//!
//! The steps run strictly in order as an explicit state machine
//! (`ValidatingCode -> Analyzing -> Persisting`). A failed step ends the run; the form
//! returns to idle through `FeedbackForm::finish_submit` whatever the outcome.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::feedback::{AnalysisResult, FeedbackRecord, Notice, SubmissionRequest, SubmitReceipt};
use crate::i18n::{Localizer, MessageKey};

pub(crate) type ServiceFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The three remote collaborators the pipeline talks to.
pub(crate) trait FeedbackServices: Send + Sync {
    /// Any success status means the code is known.
    fn validate_code<'a>(&'a self, code: &'a str) -> ServiceFuture<'a, ()>;

    fn analyze<'a>(&'a self, comment: &'a str) -> ServiceFuture<'a, AnalysisResult>;

    fn submit<'a>(
        &'a self,
        record: &'a FeedbackRecord,
        idempotency_key: &'a str,
    ) -> ServiceFuture<'a, SubmitReceipt>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PipelineStage {
    ValidatingCode,
    Analyzing,
    Persisting,
}

impl PipelineStage {
    /// Progress text shown while this stage runs.
    pub(crate) fn message_key(self) -> MessageKey {
        match self {
            PipelineStage::ValidatingCode => MessageKey::StageValidatingCode,
            PipelineStage::Analyzing => MessageKey::StageAnalyzing,
            PipelineStage::Persisting => MessageKey::StagePersisting,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PipelineOutcome {
    Saved {
        sentiment: String,
        message: Option<String>,
    },
    /// The validation service answered with a non-success status.
    InvalidCode,
    /// The validation service could not be reached.
    CodeCheckFailed { reason: String },
    AnalysisFailed { reason: String },
    /// The persistence API refused the record.
    Rejected { message: Option<String> },
    NetworkFailed { reason: String },
}

impl PipelineOutcome {
    pub(crate) fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Saved { .. })
    }

    pub(crate) fn notice(&self, l10n: &Localizer) -> Notice {
        match self {
            PipelineOutcome::Saved { .. } => Notice::success(l10n.t(MessageKey::Saved)),
            PipelineOutcome::InvalidCode => Notice::error(l10n.t(MessageKey::InvalidCode)),
            PipelineOutcome::CodeCheckFailed { .. } => {
                Notice::error(l10n.t(MessageKey::CodeValidationError))
            }
            PipelineOutcome::AnalysisFailed { .. } => {
                Notice::error(l10n.t(MessageKey::AnalysisError))
            }
            PipelineOutcome::Rejected { message } => match message {
                Some(message) => Notice::error(message.clone()),
                None => Notice::error(l10n.t(MessageKey::SaveError)),
            },
            PipelineOutcome::NetworkFailed { reason } => {
                Notice::error(format!("{}{reason}", l10n.t(MessageKey::NetworkError)))
            }
        }
    }
}

enum Step {
    ValidatingCode,
    Analyzing,
    Persisting(AnalysisResult),
    Done(PipelineOutcome),
}

/// Run one submission. `on_stage` is called on every transition into a remote step.
pub(crate) async fn run_pipeline<S, F>(
    services: &S,
    request: &SubmissionRequest,
    mut on_stage: F,
) -> PipelineOutcome
where
    S: FeedbackServices + ?Sized,
    F: FnMut(PipelineStage) + Send,
{
    let key = request.idempotency_key.as_str();
    let mut step = Step::ValidatingCode;

    loop {
        step = match step {
            Step::ValidatingCode => {
                on_stage(PipelineStage::ValidatingCode);
                if !request.requires_code_check() {
                    debug!(submission = key, "anonymous code, skipping validation");
                    Step::Analyzing
                } else {
                    match services.validate_code(&request.unique_code).await {
                        Ok(()) => Step::Analyzing,
                        Err(ApiError::Api { status, .. }) => {
                            info!(submission = key, status, "unique code rejected");
                            Step::Done(PipelineOutcome::InvalidCode)
                        }
                        Err(err) => {
                            warn!(submission = key, error = %err, "code validation failed");
                            Step::Done(PipelineOutcome::CodeCheckFailed {
                                reason: err.to_string(),
                            })
                        }
                    }
                }
            }
            Step::Analyzing => {
                on_stage(PipelineStage::Analyzing);
                match services.analyze(&request.comment).await {
                    Ok(analysis) => Step::Persisting(analysis),
                    Err(err) => {
                        warn!(submission = key, error = %err, "sentiment analysis failed");
                        Step::Done(PipelineOutcome::AnalysisFailed {
                            reason: err.to_string(),
                        })
                    }
                }
            }
            Step::Persisting(analysis) => {
                on_stage(PipelineStage::Persisting);
                let sentiment = analysis.sentiment_label();
                let record = FeedbackRecord::from_analysis(request, analysis);
                match services.submit(&record, key).await {
                    Ok(receipt) => {
                        info!(
                            submission = key,
                            sentiment = %sentiment,
                            id = receipt.id.as_deref().unwrap_or("-"),
                            "feedback saved"
                        );
                        Step::Done(PipelineOutcome::Saved {
                            sentiment,
                            message: receipt.message,
                        })
                    }
                    Err(ApiError::Api { status, message }) => {
                        warn!(submission = key, status, "feedback rejected by server");
                        Step::Done(PipelineOutcome::Rejected { message })
                    }
                    Err(err) => {
                        warn!(submission = key, error = %err, "feedback submission failed");
                        Step::Done(PipelineOutcome::NetworkFailed {
                            reason: err.to_string(),
                        })
                    }
                }
            }
            Step::Done(outcome) => return outcome,
        };
    }
}
