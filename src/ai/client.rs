//! Chat-completion API client: request construction, the transport seam,
//! and response interpretation.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::core::config::{ApiKey, StageConfig};
use crate::errors::StageError;

/// Role carried by the single message built from record content.
pub const USER_ROLE: &str = "user";

/// One message in the chat-completion payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Wire body of a chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequestBody {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequestBody {
    /// Builds the single-user-message body carrying the record text
    /// verbatim. No truncation; escaping is whatever JSON string encoding
    /// requires.
    #[must_use]
    pub fn from_record_text(model: &str, text: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: USER_ROLE.to_string(),
                content: text.to_string(),
            }],
        }
    }
}

/// A fully described remote call: endpoint, credential, and body.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub endpoint: Url,
    pub api_key: ApiKey,
    pub body: ChatRequestBody,
}

impl ChatRequest {
    #[must_use]
    pub fn new(config: &StageConfig, text: &str) -> Self {
        Self {
            endpoint: config.endpoint().clone(),
            api_key: config.api_key().clone(),
            body: ChatRequestBody::from_record_text(config.model(), text),
        }
    }
}

/// Raw result of one executed call, prior to interpretation.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub status: StatusCode,
    pub body: String,
}

/// Executes exactly one call per request and returns whatever came back.
///
/// Implementations must not retry. A connection-level failure surfaces as
/// `StageError::Transport`; a non-success HTTP status is still an `Ok`
/// reply and is classified by the interpreter.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ChatRequest) -> Result<ChatReply, StageError>;
}

/// Production transport over a process-wide `reqwest::Client`.
///
/// The inner client owns the connection pool; it is built once at
/// activation and shared across concurrent invocations. No timeout is
/// configured beyond reqwest's defaults and the call runs to completion.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ChatRequest) -> Result<ChatReply, StageError> {
        let payload = serde_json::to_vec(&request.body)?;

        let response = self
            .http
            .post(request.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {}", request.api_key.expose()))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "chat completion call returned");
        Ok(ChatReply { status, body })
    }
}

/// Interprets one reply: a success-range status with
/// `choices[0].message.content` present as a string yields the generated
/// text (possibly empty); anything else is a classified failure.
///
/// Every path segment is checked explicitly. A missing `choices` array, a
/// missing first element, a missing `message`, or a non-string `content`
/// is a malformed response, never silently an empty reply.
pub fn interpret_reply(reply: &ChatReply) -> Result<String, StageError> {
    if !reply.status.is_success() {
        return Err(StageError::Rejection(format!(
            "status {}: {}",
            reply.status,
            reply.body.trim()
        )));
    }

    let root: Value = serde_json::from_str(&reply.body)
        .map_err(|e| StageError::Malformed(format!("response body is not JSON: {e}")))?;

    let choices = root
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| StageError::Malformed("response has no choices array".to_string()))?;

    let first = choices
        .first()
        .ok_or_else(|| StageError::Malformed("choices array is empty".to_string()))?;

    let message = first
        .get("message")
        .ok_or_else(|| StageError::Malformed("choices[0] has no message".to_string()))?;

    let content = message.get("content").and_then(Value::as_str).ok_or_else(|| {
        StageError::Malformed("message content is missing or not a string".to_string())
    })?;

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StageSettings;
    use serde_json::json;

    fn reply(status: u16, body: &str) -> ChatReply {
        ChatReply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    fn config() -> StageConfig {
        StageConfig::activate(StageSettings {
            api_key: Some("test-key".to_string()),
            model: Some("gpt-3.5-turbo".to_string()),
            api_base: None,
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequestBody::from_record_text("gpt-3.5-turbo", "Translate: hola\n");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Translate: hola\n"}]
            })
        );
    }

    #[test]
    fn test_request_body_round_trips_awkward_text() {
        let text = "line \"one\"\nsecond 'line'\n\ttabs and unicode: caf\u{e9} \u{1F980}\n";
        let body = ChatRequestBody::from_record_text("gpt-3.5-turbo", text);
        let serialized = serde_json::to_string(&body).unwrap();
        let parsed: ChatRequestBody = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed.messages.len(), 1);
        assert_eq!(parsed.messages[0].role, USER_ROLE);
        assert_eq!(parsed.messages[0].content, text);
    }

    #[test]
    fn test_chat_request_debug_redacts_api_key() {
        let config = StageConfig::activate(StageSettings {
            api_key: Some("sk-very-secret".to_string()),
            model: None,
            api_base: None,
        })
        .unwrap();
        let request = ChatRequest::new(&config, "hi");
        let debug_str = format!("{request:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("sk-very-secret"));
    }

    #[test]
    fn test_interpret_extracts_content() {
        let body = json!({"choices": [{"message": {"content": "hello"}}]}).to_string();
        assert_eq!(interpret_reply(&reply(200, &body)).unwrap(), "hello");
    }

    #[test]
    fn test_interpret_accepts_empty_content_string() {
        let body = json!({"choices": [{"message": {"content": ""}}]}).to_string();
        assert_eq!(interpret_reply(&reply(200, &body)).unwrap(), "");
    }

    #[test]
    fn test_interpret_rejects_non_success_status() {
        let err = interpret_reply(&reply(429, r#"{"error":"rate limited"}"#)).unwrap_err();
        assert!(matches!(err, StageError::Rejection(_)));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_interpret_rejects_regardless_of_valid_body_shape() {
        // A well-shaped body does not rescue a failing status.
        let body = json!({"choices": [{"message": {"content": "hello"}}]}).to_string();
        let err = interpret_reply(&reply(500, &body)).unwrap_err();
        assert!(matches!(err, StageError::Rejection(_)));
    }

    #[test]
    fn test_interpret_fails_on_non_json_body() {
        let err = interpret_reply(&reply(200, "<html>gateway error</html>")).unwrap_err();
        assert!(matches!(err, StageError::Malformed(_)));
    }

    #[test]
    fn test_interpret_fails_on_missing_choices() {
        let err = interpret_reply(&reply(200, r#"{"id":"cmpl-1"}"#)).unwrap_err();
        assert!(matches!(err, StageError::Malformed(_)));
        assert!(err.to_string().contains("choices"));
    }

    #[test]
    fn test_interpret_fails_on_choices_not_an_array() {
        let body = json!({"choices": {"message": {"content": "hello"}}}).to_string();
        let err = interpret_reply(&reply(200, &body)).unwrap_err();
        assert!(matches!(err, StageError::Malformed(_)));
    }

    #[test]
    fn test_interpret_fails_on_empty_choices_array() {
        // Lenient traversal would coerce this to "": it must be an error.
        let err = interpret_reply(&reply(200, r#"{"choices":[]}"#)).unwrap_err();
        assert!(matches!(err, StageError::Malformed(_)));
    }

    #[test]
    fn test_interpret_fails_on_missing_message() {
        let err = interpret_reply(&reply(200, r#"{"choices":[{}]}"#)).unwrap_err();
        assert!(matches!(err, StageError::Malformed(_)));
    }

    #[test]
    fn test_interpret_fails_on_null_content() {
        let body = json!({"choices": [{"message": {"content": null}}]}).to_string();
        let err = interpret_reply(&reply(200, &body)).unwrap_err();
        assert!(matches!(err, StageError::Malformed(_)));
    }

    #[test]
    fn test_interpret_fails_on_non_string_content() {
        let body = json!({"choices": [{"message": {"content": 42}}]}).to_string();
        let err = interpret_reply(&reply(200, &body)).unwrap_err();
        assert!(matches!(err, StageError::Malformed(_)));
    }

    #[test]
    fn test_chat_request_carries_config_endpoint_and_model() {
        let request = ChatRequest::new(&config(), "ping\n");
        assert_eq!(
            request.endpoint.as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(request.body.model, "gpt-3.5-turbo");
        assert_eq!(request.body.messages[0].content, "ping\n");
    }
}
