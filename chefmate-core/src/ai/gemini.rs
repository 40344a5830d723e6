//! Gemini (Google Generative Language API) client.

use async_trait::async_trait;
use base64::Engine;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

use super::client::{AiClient, AiError};
use super::config::AiConfig;
use super::types::{GenerateRequest, GenerateResponse, OnUpdate, Part, Usage};

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client from configuration.
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AiError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// POST the request and turn non-success statuses into [`AiError::Api`].
    async fn post(
        &self,
        url: &str,
        request: &GenerateRequest,
    ) -> Result<reqwest::Response, AiError> {
        let body = GeminiRequest::from_request(request);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        Err(api_error(status, &body))
    }
}

/// Build an [`AiError::Api`] from an error body, preferring the structured message.
fn api_error(status: u16, body: &str) -> AiError {
    let message = match serde_json::from_str::<GeminiErrorResponse>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(code) => format!("{}: {}", code, parsed.error.message),
            None => parsed.error.message,
        },
        Err(_) => body.to_string(),
    };
    AiError::Api { status, message }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, AiError> {
        let url = self.endpoint(model, "generateContent");
        tracing::debug!(model = model, "Calling Gemini generateContent");

        let response = self.post(&url, request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let parsed: GeminiResponse =
            serde_json::from_str(&body).map_err(|e| AiError::ParseError(e.to_string()))?;

        if let Some(reason) = parsed.block_reason() {
            tracing::warn!(model = model, reason = reason, "Gemini blocked the prompt");
        }

        Ok(GenerateResponse {
            content: parsed.text(),
            usage: parsed.usage(),
            model: model.to_string(),
            cached: false,
        })
    }

    async fn generate_stream(
        &self,
        model: &str,
        request: &GenerateRequest,
        on_update: OnUpdate<'_>,
    ) -> Result<GenerateResponse, AiError> {
        let url = format!("{}?alt=sse", self.endpoint(model, "streamGenerateContent"));
        tracing::debug!(model = model, "Calling Gemini streamGenerateContent");

        let response = self.post(&url, request).await?;
        let mut stream = response.bytes_stream();

        let mut pending: Vec<u8> = Vec::new();
        let mut accumulated = String::new();
        let mut usage = Usage::default();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AiError::RequestFailed(format!("Stream error: {}", e)))?;
            pending.extend_from_slice(&chunk);

            for data in drain_sse_events(&mut pending) {
                apply_stream_event(&data, &mut accumulated, &mut usage, on_update)?;
            }
        }

        // The final event may arrive without a trailing blank line.
        if let Some(data) = event_data(&String::from_utf8_lossy(&pending)) {
            apply_stream_event(&data, &mut accumulated, &mut usage, on_update)?;
        }

        Ok(GenerateResponse {
            content: accumulated,
            usage,
            model: model.to_string(),
            cached: false,
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

fn apply_stream_event(
    data: &str,
    accumulated: &mut String,
    usage: &mut Usage,
    on_update: OnUpdate<'_>,
) -> Result<(), AiError> {
    // Every field of GeminiResponse is optional, so errors must be matched first
    if let Ok(err) = serde_json::from_str::<GeminiErrorResponse>(data) {
        return Err(api_error(err.error.code.unwrap_or(500), data));
    }

    let event: GeminiResponse = serde_json::from_str(data)
        .map_err(|e| AiError::ParseError(format!("Invalid stream event: {}", e)))?;

    if event.usage_metadata.is_some() {
        *usage = event.usage();
    }

    let delta = event.text();
    if !delta.is_empty() {
        accumulated.push_str(&delta);
        on_update(accumulated);
    }

    Ok(())
}

/// Remove every complete server-sent event from `buffer`, returning their data payloads.
///
/// Works on bytes so a multi-byte character split across network chunks is only
/// decoded once the whole event has arrived.
pub(crate) fn drain_sse_events(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut events = Vec::new();

    while let Some((end, separator_len)) = find_event_boundary(buffer) {
        let raw: Vec<u8> = buffer.drain(..end + separator_len).take(end).collect();
        if let Some(data) = event_data(&String::from_utf8_lossy(&raw)) {
            events.push(data);
        }
    }

    events
}

fn find_event_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    (0..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else {
            None
        }
    })
}

/// Join the `data:` lines of one event. `None` if the event carries no data.
fn event_data(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

// --- Wire format ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum GeminiPart {
    Text(String),
    InlineData(InlineBlob),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineBlob {
    mime_type: String,
    /// Base64-encoded bytes.
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl<'a> GeminiRequest<'a> {
    fn from_request(request: &'a GenerateRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => GeminiPart::Text(text.clone()),
                Part::InlineData { mime_type, data } => GeminiPart::InlineData(InlineBlob {
                    mime_type: mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(data),
                }),
            })
            .collect();

        Self {
            system_instruction: request.system_instruction.as_ref().map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text(text.clone())],
            }),
            contents: vec![GeminiContent {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json"),
                response_schema: request.response_schema.as_ref(),
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn usage(&self) -> Usage {
        self.usage_metadata
            .as_ref()
            .map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default()
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    #[serde(default)]
    code: Option<u16>,
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Error response from the Gemini API.
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiApiError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-test";

    fn client_for(server: &MockServer) -> GeminiClient {
        let mut config = AiConfig::new("test-key");
        config.base_url = format!("{}/v1beta", server.uri());
        config.timeout_secs = 5;
        GeminiClient::new(&config).unwrap()
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            system_instruction: Some("Be a chef".to_string()),
            parts: vec![
                Part::inline_data("image/png", vec![1, 2, 3]),
                Part::text("Lasagne"),
            ],
            response_schema: Some(json!({"type": "OBJECT"})),
            temperature: Some(0.5),
            max_output_tokens: None,
        }
    }

    fn candidate(text: &str) -> serde_json::Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
    }

    #[test]
    fn serializes_gemini_wire_format() {
        let req = request();
        let body = serde_json::to_value(GeminiRequest::from_request(&req)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be a chef");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["contents"][0]["parts"][0]["inlineData"],
            json!({"mimeType": "image/png", "data": "AQID"})
        );
        assert_eq!(body["contents"][0]["parts"][1]["text"], "Lasagne");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn drains_complete_events_only() {
        let mut buffer = b"data: {\"a\":1}\n\ndata: {\"b\"".to_vec();
        assert_eq!(drain_sse_events(&mut buffer), vec!["{\"a\":1}"]);
        assert_eq!(buffer, b"data: {\"b\"");

        buffer.extend_from_slice(b":2}\r\n\r\n: keep-alive\n\n");
        assert_eq!(drain_sse_events(&mut buffer), vec!["{\"b\":2}"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn split_multibyte_characters_survive() {
        let event = "data: {\"t\":\"Grüße\"}\n\n".as_bytes();
        let split = event.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut buffer = event[..split].to_vec();
        assert!(drain_sse_events(&mut buffer).is_empty());
        buffer.extend_from_slice(&event[split..]);
        assert_eq!(drain_sse_events(&mut buffer), vec!["{\"t\":\"Grüße\"}"]);
    }

    #[tokio::test]
    async fn generate_returns_text_and_usage() {
        let server = MockServer::start().await;
        let mut body = candidate("{\"originalName\":");
        body["candidates"][0]["content"]["parts"]
            .as_array_mut()
            .unwrap()
            .push(json!({"text": "\"Lasagne\"}"}));
        body["usageMetadata"] =
            json!({"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15});

        Mock::given(method("POST"))
            .and(path(format!("/v1beta/models/{}:generateContent", MODEL)))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).generate(MODEL, &request()).await.unwrap();
        assert_eq!(response.content, "{\"originalName\":\"Lasagne\"}");
        assert_eq!(response.usage.total_tokens, 15);
        assert_eq!(response.model, MODEL);
        assert!(!response.cached);
    }

    #[tokio::test]
    async fn unavailable_status_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(MODEL, &request()).await.unwrap_err();
        match &err {
            AiError::Api { status, message } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "UNAVAILABLE: The model is overloaded.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn auth_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(MODEL, &request()).await.unwrap_err();
        assert!(matches!(err, AiError::Api { status: 401, ref message } if message == "unauthorized"));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn stream_reports_cumulative_text() {
        let server = MockServer::start().await;
        let sse = format!(
            "data: {}\r\n\r\ndata: {}\r\n\r\ndata: {}",
            candidate("{\"originalName\":"),
            candidate("\"Käsespätzle\"}"),
            json!({"candidates": [], "usageMetadata": {"totalTokenCount": 42}}),
        );

        Mock::given(method("POST"))
            .and(path(format!("/v1beta/models/{}:streamGenerateContent", MODEL)))
            .and(query_param("alt", "sse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let updates = Mutex::new(Vec::new());
        let on_update = |text: &str| updates.lock().unwrap().push(text.to_string());

        let response = client_for(&server)
            .generate_stream(MODEL, &request(), &on_update)
            .await
            .unwrap();

        let updates = updates.into_inner().unwrap();
        assert_eq!(
            updates,
            vec![
                "{\"originalName\":".to_string(),
                "{\"originalName\":\"Käsespätzle\"}".to_string(),
            ]
        );
        assert_eq!(response.content, "{\"originalName\":\"Käsespätzle\"}");
        assert_eq!(response.usage.total_tokens, 42);
    }

    #[tokio::test]
    async fn error_event_inside_stream_is_transient() {
        let server = MockServer::start().await;
        let sse = format!(
            "data: {}\n\ndata: {}\n\n",
            candidate("{\"originalName\":"),
            json!({"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}),
        );

        Mock::given(method("POST"))
            .and(path(format!("/v1beta/models/{}:streamGenerateContent", MODEL)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let updates = Mutex::new(Vec::new());
        let on_update = |text: &str| updates.lock().unwrap().push(text.to_string());

        let err = client_for(&server)
            .generate_stream(MODEL, &request(), &on_update)
            .await
            .unwrap_err();

        match &err {
            AiError::Api { status, message } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "UNAVAILABLE: The model is overloaded.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_transient());
        assert_eq!(updates.into_inner().unwrap(), vec!["{\"originalName\":"]);
    }

    #[tokio::test]
    async fn stream_error_status_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let on_update = |_: &str| panic!("no updates expected");
        let err = client_for(&server)
            .generate_stream(MODEL, &request(), &on_update)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
