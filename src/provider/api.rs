use std::error::Error as _;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, ProviderError, prompts};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request/response structs for the chat-completions wire shape.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Backend that posts a chat-completion request to a configured endpoint
/// (LM Studio, Ollama's OpenAI shim, or a hosted API).
#[derive(Debug)]
pub struct ApiProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl ApiProvider {
    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        ApiProvider {
            client,
            endpoint,
            api_key,
            model,
        }
    }

    fn call_api(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompts::API_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: 500,
            temperature: 0.7,
        };

        log::debug!("calling chat endpoint {} with model {}", self.endpoint, self.model);

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .map_err(|err| map_request_error(&err, &self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Transport(format!(
                "API error ({}): {}",
                status.as_u16(),
                server_error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string())
            )));
        }

        let envelope: ChatResponse = response.json().map_err(|_| {
            ProviderError::MalformedResponse("Invalid response format from API".to_string())
        })?;

        extract_content(envelope)
    }
}

impl Provider for ApiProvider {
    fn execute(&self, prompt: &str) -> Result<String, ProviderError> {
        self.call_api(prompt)
    }
}

/// Pull `choices[0].message.content` out of the envelope, with distinct
/// messages for a missing choice and missing content.
fn extract_content(envelope: ChatResponse) -> Result<String, ProviderError> {
    let Some(choice) = envelope.choices.into_iter().next() else {
        return Err(ProviderError::MalformedResponse(
            "Invalid response format from API".to_string(),
        ));
    };

    match choice.message.and_then(|message| message.content) {
        Some(content) if !content.trim().is_empty() => Ok(content.trim().to_string()),
        _ => Err(ProviderError::MalformedResponse(
            "No content in API response".to_string(),
        )),
    }
}

/// Classify a transport failure into an actionable message naming the
/// endpoint. DNS failures surface inside the connect error chain.
fn map_request_error(err: &reqwest::Error, endpoint: &str) -> ProviderError {
    if err.is_timeout() {
        return ProviderError::Transport(format!("API request to {endpoint} timed out"));
    }

    if err.is_connect() {
        let mut source = err.source();
        while let Some(inner) = source {
            if inner.to_string().contains("dns error") {
                return ProviderError::Transport(format!("API endpoint not found: {endpoint}"));
            }
            source = inner.source();
        }
        return ProviderError::Transport(format!(
            "Cannot connect to API endpoint: {endpoint}. Check if the service is running."
        ));
    }

    ProviderError::Transport(format!("API request failed: {err}"))
}

/// Best-effort extraction of `error.message` from a failed response body.
fn server_error_message(body: &str) -> Option<String> {
    let envelope: ApiErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope.error?.message.filter(|message| !message.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_extracted_from_the_envelope() {
        let envelope: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  [\"ok\"] "}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(envelope).unwrap(), r#"["ok"]"#);
    }

    #[test]
    fn empty_choices_is_malformed() {
        let envelope: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let err = extract_content(envelope).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn missing_content_is_malformed() {
        let envelope: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        let err = extract_content(envelope).unwrap_err();
        assert!(err.to_string().contains("No content"));
    }

    #[test]
    fn server_error_message_is_preferred() {
        let body = r#"{"error":{"message":"model is loading"}}"#;
        assert_eq!(
            server_error_message(body).as_deref(),
            Some("model is loading")
        );
        assert_eq!(server_error_message("not json"), None);
        assert_eq!(server_error_message(r#"{"error":{}}"#), None);
    }

    #[test]
    fn refused_connection_names_the_endpoint() {
        // Port 1 is never listening locally; connect is refused immediately.
        let provider = ApiProvider::new(
            "http://127.0.0.1:1/v1/chat/completions".to_string(),
            None,
            "test-model".to_string(),
        );
        let err = provider.execute("prompt").unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        let message = err.to_string();
        assert!(message.contains("127.0.0.1:1"));
        assert!(message.contains("Check if the service is running"));
    }
}
