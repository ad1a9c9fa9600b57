use std::sync::OnceLock;
use std::time::Duration;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use crate::config::AiConfig;
use crate::error::AiError;

/// One generation request. `schema` switches the model into JSON mode.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: Option<serde_json::Value>,
}

impl GenerationRequest {
    pub fn text<S: Into<String>>(prompt: S) -> Self {
        GenerationRequest { prompt: prompt.into(), schema: None }
    }

    pub fn json<S: Into<String>>(prompt: S, schema: serde_json::Value) -> Self {
        GenerationRequest { prompt: prompt.into(), schema: Some(schema) }
    }
}

/// A hosted text model. Returns the raw text of the first candidate.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String, AiError>;
}

/// Reusable HTTP client singleton
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn get_http_client(timeout_secs: u64) -> Result<&'static Client, AiError> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client);
    }
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()?;
    Ok(HTTP_CLIENT.get_or_init(|| client))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// `generateContent` over the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiBackend {
    pub fn new(config: &AiConfig) -> Self {
        GeminiBackend {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(request: &'a GenerationRequest) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(request.prompt.clone()) }],
            }],
            generation_config: request.schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        }
    }

    /// Map a non-2xx body to an error, preferring the API's own message
    fn map_api_error(status: u16, body: &str) -> AiError {
        let (message, api_status) = serde_json::from_str::<GeminiResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map(|e| (e.message, e.status))
            .unwrap_or_else(|| (body.to_string(), None));
        let message = match api_status {
            Some(s) if !message.contains(&s) => format!("{} ({})", message, s),
            _ => message,
        };
        AiError::classify(status, &message)
    }

    async fn send(&self, api_key: &str, request: &GenerationRequest) -> anyhow::Result<(u16, String)> {
        let client = get_http_client(self.timeout_secs)?;
        let response = client
            .post(self.build_url())
            .header("x-goog-api-key", api_key)
            .json(&Self::build_request(request))
            .send()
            .await
            .with_context(|| format!("Failed to reach Gemini API for model '{}'", self.model))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from model '{}'", self.model))?;
        Ok((status, body))
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> Result<String, AiError> {
        let start = std::time::Instant::now();
        let (status, body) = self.send(api_key, request).await.map_err(|e| {
            match e.downcast::<AiError>() {
                Ok(ai) => ai,
                Err(e) => match e.downcast::<reqwest::Error>() {
                    Ok(http) => AiError::Http(http),
                    Err(other) => AiError::Api { status: 0, message: format!("{:#}", other) },
                },
            }
        })?;
        let duration_ms = start.elapsed().as_millis() as u64;

        if !(200..300).contains(&status) {
            tracing::warn!(
                model = %self.model,
                status = status,
                duration_ms = duration_ms,
                "Gemini API error"
            );
            return Err(Self::map_api_error(status, &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::Decode(format!("Failed to parse Gemini response: {}", e)))?;
        if let Some(error) = parsed.error {
            return Err(AiError::classify(status, &error.message));
        }

        let text: String = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        tracing::debug!(
            model = %self.model,
            duration_ms = duration_ms,
            response_len = text.len(),
            json_mode = request.schema.is_some(),
            "Gemini call completed"
        );

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}
