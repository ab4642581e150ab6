// Gemini extraction backend
//
// One `generateContent` call per extraction with JSON structured output:
//   POST {api_base}/models/{model}:generateContent
//   x-goog-api-key: {key}
//
// The candidate text is parsed straight into a card and validated locally.

use super::prompt::build_prompt;
use super::schema::response_schema;
use super::{ExtractionError, InsightExtractor};
use crate::card::InsightCardData;
use crate::config::ExtractionConfig;
use serde::Deserialize;
use std::time::Duration;

/// Extractor backed by the Gemini `generateContent` REST endpoint
pub struct GeminiExtractor {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiExtractor {
    /// Create a new Gemini extractor
    ///
    /// # Errors
    /// Returns an error if the API key is missing or client creation fails
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ExtractionError::MissingApiKey)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Network(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini extractor: {} (model: {})",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the generateContent request
    fn build_request(&self, source_text: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": build_prompt(source_text) }]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": response_schema(),
                }
            }))
    }

    /// Map the HTTP response to a card or an extraction error
    fn parse_response(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<InsightCardData, ExtractionError> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().unwrap_or_default();
            let message = service_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

            tracing::debug!("Gemini returned {}: {}", status_code, body);

            return Err(match status_code {
                401 | 403 => ExtractionError::Unauthorized(message),
                429 => ExtractionError::QuotaExceeded(message),
                _ => ExtractionError::Service {
                    status: status_code,
                    message,
                },
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .map_err(|e| ExtractionError::Malformed(format!("Failed to parse response: {}", e)))?;

        let text = body.candidate_text()?;
        tracing::debug!("Gemini candidate text: {} bytes", text.len());

        InsightCardData::from_json(text.trim()).map_err(ExtractionError::from)
    }
}

impl InsightExtractor for GeminiExtractor {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn extract(&self, source_text: &str) -> Result<InsightCardData, ExtractionError> {
        tracing::info!(
            "Requesting insight card ({} chars, model: {})",
            source_text.chars().count(),
            self.model
        );

        let response = self
            .build_request(source_text)
            .send()
            .map_err(|e| ExtractionError::Network(format!("Request failed: {}", e)))?;

        let card = self.parse_response(response)?;
        tracing::info!(
            "Extracted card \"{}\" with {} stages",
            card.title(),
            card.stages().len()
        );
        Ok(card)
    }
}

/// Pull `error.message` out of a Gemini error body
fn service_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Response format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn candidate_text(self) -> Result<String, ExtractionError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ExtractionError::EmptyResponse(format!(
                "prompt blocked ({})",
                reason
            )));
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ExtractionError::EmptyResponse("no candidates".to_string()));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "empty text".to_string());
            return Err(ExtractionError::EmptyResponse(reason));
        }

        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::card_json;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/models/test-model:generateContent";

    fn config_for(uri: &str) -> ExtractionConfig {
        ExtractionConfig {
            api_base: uri.to_string(),
            model: "test-model".to_string(),
            timeout_secs: 5,
            api_key: Some("test-key".to_string()),
        }
    }

    fn candidate_body(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    /// The blocking client must live and die off the async runtime
    async fn extract_against(uri: String, text: &'static str) -> Result<InsightCardData, ExtractionError> {
        tokio::task::spawn_blocking(move || {
            let extractor = GeminiExtractor::new(&config_for(&uri))?;
            extractor.extract(text)
        })
        .await
        .expect("extraction task panicked")
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = config_for("http://localhost");
        config.api_key = None;
        assert!(matches!(
            GeminiExtractor::new(&config),
            Err(ExtractionError::MissingApiKey)
        ));

        config.api_key = Some("   ".to_string());
        assert!(matches!(
            GeminiExtractor::new(&config),
            Err(ExtractionError::MissingApiKey)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_successful_extraction_single_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate_body(&format!("  {}\n", card_json(4)))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let card = extract_against(server.uri(), "一篇文章").await.unwrap();
        assert_eq!(card.stages().len(), 4);
        assert_eq!(card.title(), "深度工作的力量");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_request_declares_schema_and_embeds_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_body(&card_json(3).to_string())),
            )
            .mount(&server)
            .await;

        extract_against(server.uri(), "专注是一种可以设计的能力")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();

        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("专注是一种可以设计的能力"));

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["properties"]["stages"]["minItems"], 3);
        assert_eq!(config["responseSchema"]["properties"]["stages"]["maxItems"], 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_quota_exceeded_maps_to_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = extract_against(server.uri(), "文章").await.unwrap_err();
        assert!(matches!(err, ExtractionError::QuotaExceeded(_)));
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let err = extract_against(server.uri(), "文章").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Unauthorized(ref m) if m == "API key not valid"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_server_error_without_body_uses_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = extract_against(server.uri(), "文章").await.unwrap_err();
        match err {
            ExtractionError::Service { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_non_conforming_payload_rejected() {
        let mut payload = card_json(3);
        payload["stages"].as_array_mut().unwrap().truncate(2);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(&payload.to_string())))
            .mount(&server)
            .await;

        let err = extract_against(server.uri(), "文章").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Contract(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unparseable_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("Sure! Here is")))
            .mount(&server)
            .await;

        let err = extract_against(server.uri(), "文章").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocked_prompt_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = extract_against(server.uri(), "文章").await.unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyResponse(ref r) if r.contains("SAFETY")));
    }

    #[test]
    fn test_multi_part_candidate_concatenated() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(body.candidate_text().unwrap(), "{\"a\":1}");
    }
}
