use super::prompt::{response_schema, system_instruction};
use super::{parse_extraction, require_input, Extractor, RelayError};
use crate::components::calendar::models::EventFields;
use crate::error::{config_error, AppResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Default Gemini API base URL
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Extractor backed by the Gemini `generateContent` endpoint with JSON-schema constrained output
#[derive(Debug, Clone)]
pub struct GeminiExtractor {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GeminiExtractor {
    pub fn new(api_key: &str, model: &str, base_url: &str, timeout: Duration) -> AppResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| config_error(&format!("Invalid Gemini base URL {}: {}", base_url, e)))?;

        // Keep any path prefix when joining
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let endpoint = base
            .join(&format!("v1beta/models/{}:generateContent", model))
            .map_err(|e| config_error(&format!("Invalid Gemini model name {}: {}", model, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| config_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_request(user_text: &str, today: NaiveDate) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction(today),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: user_text.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: 0.2,
            },
        }
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(&self, user_text: &str, today: NaiveDate) -> Result<EventFields, RelayError> {
        let user_text = require_input(user_text)?;

        info!("Requesting extraction from Gemini model {}", self.model);
        debug!("Extraction input: {}", user_text);

        let res = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .header(header::ACCEPT, "application/json")
            .json(&Self::build_request(user_text, today))
            .send()
            .await
            .map_err(|e| {
                error!("Gemini request failed: {}", e);
                RelayError::Service(format!("request failed: {}", e))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            error!("Failed to read Gemini response: {}", e);
            RelayError::Service(format!("failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!("Gemini returned error: Status {}, Body: {}", status, body);
            return Err(RelayError::Service(format!("status {}", status)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Unexpected Gemini response envelope: {}", e);
            RelayError::Service(format!("unexpected response envelope: {}", e))
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            error!("Gemini response contained no candidate text: {}", body);
            return Err(RelayError::Service("response contained no text".to_string()));
        }

        info!("Received response from Gemini");
        debug!("Gemini response text: {}", text);

        parse_extraction(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let plain =
            GeminiExtractor::new("k", "gemini-2.5-flash", GEMINI_BASE_URL, Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            plain.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let proxied = GeminiExtractor::new(
            "k",
            "gemini-2.5-flash",
            "http://127.0.0.1:9000/proxy",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            proxied.endpoint().as_str(),
            "http://127.0.0.1:9000/proxy/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(GeminiExtractor::new("k", GEMINI_MODEL, "not a url", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        let body = serde_json::to_value(GeminiExtractor::build_request("lunch tomorrow", today))
            .unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "lunch tomorrow");
        assert!(body["systemInstruction"].get("role").is_none());
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("2024-06-11"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            serde_json::json!(["title", "startDate", "endDate"])
        );
    }

    #[tokio::test]
    async fn test_empty_input_never_reaches_the_network() {
        // Port 9 (discard) would fail if it were contacted; MissingInput comes first
        let extractor =
            GeminiExtractor::new("k", GEMINI_MODEL, "http://127.0.0.1:9", Duration::from_secs(1))
                .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();

        assert_eq!(
            extractor.extract("   ", today).await,
            Err(RelayError::MissingInput)
        );
    }
}
