//! API client for the feedback backend
//!
//! Handles all HTTP communication with the validation, analysis and persistence services.

use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::{self, Config};
use crate::feedback::pipeline::{FeedbackServices, ServiceFuture};
use crate::feedback::{
    AnalysisRequest, AnalysisResult, CodeValidationRequest, FeedbackRecord, SubmitReceipt,
};

const VALIDATE_CODE_PATH: &str = "/api/validate-code";
const FEEDBACK_PATH: &str = "/api/feedback";

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Server unreachable: {0}")]
    Unreachable(String),

    #[error("API error: {status} - {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::Unreachable(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }
}

/// Resolved endpoint settings (config file plus environment overrides).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub analysis_url: String,
    pub timeout_seconds: u64,
    pub verify_ssl: bool,
}

impl ApiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    fn resolve(config: &Config, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| env(key).filter(|s| !s.trim().is_empty());

        let base_url =
            non_empty("BFG_FEEDBACK_API_URL").unwrap_or_else(|| config.api.base_url.clone());
        let analysis_url = non_empty("BFG_FEEDBACK_ANALYSIS_URL")
            .unwrap_or_else(|| config.api.analysis_url.clone());

        let timeout_seconds = non_empty("BFG_FEEDBACK_API_TIMEOUT_SECONDS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or_else(|| config.api.timeout_seconds.max(1));

        let verify_ssl = non_empty("BFG_FEEDBACK_API_VERIFY_SSL")
            .and_then(|v| parse_bool_value(&v))
            .unwrap_or(config.api.verify_ssl);

        Self {
            base_url: normalize_url(&base_url, config::DEFAULT_API_URL),
            analysis_url: normalize_url(&analysis_url, config::DEFAULT_ANALYSIS_URL),
            timeout_seconds,
            verify_ssl,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServerMessage {
    #[serde(default)]
    message: Option<String>,
}

/// API client for the feedback services
pub struct ApiClient {
    client: Client,
    settings: ApiSettings,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> Self {
        let timeout = Duration::from_secs(settings.timeout_seconds.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!settings.verify_ssl)
            .build()
            .unwrap_or_else(|_| Client::new());

        ApiClient { client, settings }
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub fn validate_code_url(&self) -> String {
        format!("{}{VALIDATE_CODE_PATH}", self.settings.base_url)
    }

    pub fn feedback_url(&self) -> String {
        format!("{}{FEEDBACK_PATH}", self.settings.base_url)
    }

    /// Returns `Ok(())` for any success status.
    pub async fn validate_code(&self, code: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.validate_code_url())
            .json(&CodeValidationRequest { unique_code: code })
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        debug!(status = response.status().as_u16(), "validate-code response");
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    pub async fn analyze_comment(&self, comment: &str) -> Result<AnalysisResult, ApiError> {
        let response = self
            .client
            .post(&self.settings.analysis_url)
            .json(&AnalysisRequest { comment })
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        debug!(status = response.status().as_u16(), "analysis response");
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        let analysis = serde_json::from_str::<AnalysisResult>(&body)
            .map_err(|err| ApiError::InvalidResponse(format!("analysis body: {err}")))?;
        if !analysis.has_sentiment() {
            return Err(ApiError::InvalidResponse(
                "analysis body has no sentiment".to_string(),
            ));
        }
        Ok(analysis)
    }

    pub async fn submit_feedback(
        &self,
        record: &FeedbackRecord,
        idempotency_key: &str,
    ) -> Result<SubmitReceipt, ApiError> {
        let response = self
            .client
            .post(self.feedback_url())
            .header("Idempotency-Key", idempotency_key)
            .json(record)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        debug!(status = response.status().as_u16(), "feedback response");
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // A success status is enough; the body is informational.
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<SubmitReceipt>(&body).unwrap_or_default())
    }

    /// Reachability check used by the connectivity monitor: any HTTP answer counts.
    pub async fn health_check(&self, timeout: Duration) -> bool {
        self.client
            .head(&self.settings.base_url)
            .timeout(timeout)
            .send()
            .await
            .is_ok()
    }
}

impl FeedbackServices for ApiClient {
    fn validate_code<'a>(&'a self, code: &'a str) -> ServiceFuture<'a, ()> {
        Box::pin(ApiClient::validate_code(self, code))
    }

    fn analyze<'a>(&'a self, comment: &'a str) -> ServiceFuture<'a, AnalysisResult> {
        Box::pin(self.analyze_comment(comment))
    }

    fn submit<'a>(
        &'a self,
        record: &'a FeedbackRecord,
        idempotency_key: &'a str,
    ) -> ServiceFuture<'a, SubmitReceipt> {
        Box::pin(self.submit_feedback(record, idempotency_key))
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ServerMessage>(&body)
        .ok()
        .and_then(|m| m.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    ApiError::Api { status, message }
}

fn normalize_url(url: &str, default: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return default.to_string();
    }
    trimmed.trim_end_matches('/').to_string()
}

fn parse_bool_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::pipeline::{run_pipeline, PipelineOutcome};
    use crate::feedback::SubmissionRequest;
    use crate::i18n::Language;
    use axum::http::StatusCode;
    use axum::routing::{head, post};
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn settings_for(base_url: &str) -> ApiSettings {
        ApiSettings {
            base_url: base_url.to_string(),
            analysis_url: format!("{base_url}/predict_feedback"),
            timeout_seconds: 5,
            verify_ssl: true,
        }
    }

    fn backend(seen: Seen, code_status: StatusCode, feedback_status: StatusCode) -> Router {
        let validate_seen = seen.clone();
        let analysis_seen = seen.clone();
        let feedback_seen = seen;

        Router::new()
            .route(
                "/api/validate-code",
                post(move |Json(body): Json<serde_json::Value>| {
                    let seen = validate_seen.clone();
                    async move {
                        seen.lock().unwrap().push(("validate".to_string(), body));
                        let valid = code_status.is_success();
                        (code_status, Json(serde_json::json!({ "valid": valid })))
                    }
                }),
            )
            .route(
                "/predict_feedback",
                post(move |Json(body): Json<serde_json::Value>| {
                    let seen = analysis_seen.clone();
                    async move {
                        let comment = body["comment"]
                            .as_str()
                            .unwrap_or_default()
                            .trim()
                            .to_string();
                        seen.lock().unwrap().push(("analyze".to_string(), body));
                        Json(serde_json::json!({ "comment": comment, "sentiment": "positive" }))
                    }
                }),
            )
            .route(
                "/api/feedback",
                post(move |Json(body): Json<serde_json::Value>| {
                    let seen = feedback_seen.clone();
                    async move {
                        seen.lock().unwrap().push(("feedback".to_string(), body));
                        if feedback_status.is_success() {
                            (feedback_status, Json(serde_json::json!({ "_id": "abc123" })))
                        } else {
                            (
                                feedback_status,
                                Json(serde_json::json!({ "message": "Langue non supportée" })),
                            )
                        }
                    }
                }),
            )
            .route("/", head(|| async { StatusCode::OK }))
    }

    fn request(code: &str) -> SubmissionRequest {
        SubmissionRequest {
            language: Language::En,
            comment: " Great service ".to_string(),
            rating: 5,
            unique_code: code.to_string(),
            idempotency_key: "bfg-feedback-submit-test".to_string(),
        }
    }

    #[test]
    fn test_settings_env_overrides() {
        let config = Config::default();
        let env: HashMap<&str, &str> = HashMap::from([
            ("BFG_FEEDBACK_API_URL", "https://api.example.com/"),
            ("BFG_FEEDBACK_API_TIMEOUT_SECONDS", "0"),
            ("BFG_FEEDBACK_API_VERIFY_SSL", "no"),
            ("BFG_FEEDBACK_ANALYSIS_URL", "  "),
        ]);
        let settings = ApiSettings::resolve(&config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.base_url, "https://api.example.com");
        assert_eq!(settings.analysis_url, config::DEFAULT_ANALYSIS_URL);
        assert_eq!(settings.timeout_seconds, 30);
        assert!(!settings.verify_ssl);
    }

    #[test]
    fn test_endpoint_urls() {
        let client = ApiClient::new(settings_for("https://api.example.com"));
        assert_eq!(
            client.validate_code_url(),
            "https://api.example.com/api/validate-code"
        );
        assert_eq!(client.feedback_url(), "https://api.example.com/api/feedback");
    }

    #[test]
    fn test_normalize_url_and_bools() {
        assert_eq!(normalize_url("https://x.test//", "d"), "https://x.test");
        assert_eq!(normalize_url("", "d"), "d");
        assert_eq!(parse_bool_value("On"), Some(true));
        assert_eq!(parse_bool_value("0"), Some(false));
        assert_eq!(parse_bool_value("maybe"), None);
    }

    #[tokio::test]
    async fn test_full_submission_against_http_backend() {
        let seen: Seen = Arc::default();
        let base = serve(backend(seen.clone(), StatusCode::OK, StatusCode::CREATED)).await;
        let client = ApiClient::new(settings_for(&base));

        let outcome = run_pipeline(&client, &request("XYZ123"), |_| {}).await;
        assert!(outcome.is_success(), "{outcome:?}");

        let seen = seen.lock().unwrap();
        let kinds = seen.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
        assert_eq!(kinds, vec!["validate", "analyze", "feedback"]);
        assert_eq!(seen[0].1, serde_json::json!({ "uniqueCode": "XYZ123" }));
        assert_eq!(seen[1].1, serde_json::json!({ "comment": " Great service " }));
        assert_eq!(
            seen[2].1,
            serde_json::json!({
                "language": "en",
                "comment": "Great service",
                "rating": 5,
                "uniqueCode": "XYZ123",
                "sentiment": "positive"
            })
        );
    }

    #[tokio::test]
    async fn test_rejected_code_maps_to_invalid_code() {
        let seen: Seen = Arc::default();
        let base = serve(backend(seen.clone(), StatusCode::NOT_FOUND, StatusCode::OK)).await;
        let client = ApiClient::new(settings_for(&base));

        let outcome = run_pipeline(&client, &request("NOPE"), |_| {}).await;
        assert_eq!(outcome, PipelineOutcome::InvalidCode);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_message_is_extracted() {
        let seen: Seen = Arc::default();
        let base = serve(backend(seen, StatusCode::OK, StatusCode::BAD_REQUEST)).await;
        let client = ApiClient::new(settings_for(&base));

        let outcome = run_pipeline(&client, &request(""), |_| {}).await;
        assert_eq!(
            outcome,
            PipelineOutcome::Rejected {
                message: Some("Langue non supportée".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_unparseable_analysis_is_an_error() {
        let router = Router::new().route(
            "/predict_feedback",
            post(|| async { (StatusCode::OK, "not json") }),
        );
        let base = serve(router).await;
        let client = ApiClient::new(settings_for(&base));

        let err = client.analyze_comment("hello").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_analysis_without_sentiment_stops_before_persistence() {
        let seen: Seen = Arc::default();
        let feedback_seen = seen.clone();
        let router = Router::new()
            .route(
                "/predict_feedback",
                post(|| async { Json(serde_json::json!({ "comment": "x" })) }),
            )
            .route(
                "/api/feedback",
                post(move |Json(body): Json<serde_json::Value>| {
                    let seen = feedback_seen.clone();
                    async move {
                        seen.lock().unwrap().push(("feedback".to_string(), body));
                        StatusCode::CREATED
                    }
                }),
            );
        let base = serve(router).await;
        let client = ApiClient::new(settings_for(&base));

        let err = client.analyze_comment("x").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)), "{err:?}");

        let outcome = run_pipeline(&client, &request(""), |_| {}).await;
        assert!(
            matches!(outcome, PipelineOutcome::AnalysisFailed { .. }),
            "{outcome:?}"
        );
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_null_sentiment_is_an_error() {
        let router = Router::new().route(
            "/predict_feedback",
            post(|| async { Json(serde_json::json!({ "comment": "x", "sentiment": null })) }),
        );
        let base = serve(router).await;
        let client = ApiClient::new(settings_for(&base));

        let err = client.analyze_comment("x").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(settings_for(&format!("http://{addr}")));
        let err = client.validate_code("XYZ123").await.unwrap_err();
        assert!(matches!(err, ApiError::Unreachable(_)), "{err:?}");
        assert!(!client.health_check(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_health_check_accepts_any_http_answer() {
        let seen: Seen = Arc::default();
        let base = serve(backend(seen, StatusCode::OK, StatusCode::OK)).await;
        let client = ApiClient::new(settings_for(&base));
        assert!(client.health_check(Duration::from_secs(2)).await);
    }
}
