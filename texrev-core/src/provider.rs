//! Chat provider capability.
//!
//! Each vendor is a variant of [`Provider`] built from the matching
//! [`ProviderSettings`] variant. A provider only knows how to shape a request
//! and read a reply; the bytes travel through a caller-supplied [`Transport`],
//! so no HTTP client lives in this crate.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{BoxedError, Error, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama2";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The supported vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Ollama,
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Order used when no provider is explicitly preferred.
    pub const PRIORITY: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::Ollama,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::Ollama => "Ollama",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic Claude",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_owned()
}
fn default_ollama_model() -> String {
    DEFAULT_OLLAMA_MODEL.to_owned()
}
fn default_ollama_endpoint() -> String {
    DEFAULT_OLLAMA_ENDPOINT.to_owned()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_owned()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.to_owned()
}

/// Per-vendor settings, keyed by `type` in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderSettings {
    Gemini {
        api_key: String,
        #[serde(default = "default_gemini_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
    OpenAi {
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
    },
    Anthropic {
        api_key: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
    },
}

impl ProviderSettings {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderSettings::Gemini { .. } => ProviderKind::Gemini,
            ProviderSettings::Ollama { .. } => ProviderKind::Ollama,
            ProviderSettings::OpenAi { .. } => ProviderKind::OpenAi,
            ProviderSettings::Anthropic { .. } => ProviderKind::Anthropic,
        }
    }

    /// Hosted vendors need an API key; Ollama needs an endpoint.
    pub fn is_configured(&self) -> bool {
        match self {
            ProviderSettings::Ollama { endpoint, .. } => !endpoint.trim().is_empty(),
            ProviderSettings::Gemini { api_key, .. }
            | ProviderSettings::OpenAi { api_key, .. }
            | ProviderSettings::Anthropic { api_key, .. } => !api_key.trim().is_empty(),
        }
    }

    pub fn to_provider(&self) -> Provider {
        match self.clone() {
            ProviderSettings::Gemini { api_key, model } => Provider::Gemini(Gemini { api_key, model }),
            ProviderSettings::Ollama { endpoint, model } => Provider::Ollama(Ollama {
                endpoint: endpoint.trim_end_matches('/').to_owned(),
                model,
            }),
            ProviderSettings::OpenAi { api_key, model } => Provider::OpenAi(OpenAi { api_key, model }),
            ProviderSettings::Anthropic { api_key, model } => {
                Provider::Anthropic(Anthropic { api_key, model })
            }
        }
    }
}

/// Picks the provider to use from `settings`.
///
/// `preferred` wins when it is present and configured; otherwise the first
/// configured entry in [`ProviderKind::PRIORITY`] order is used.
pub fn select_provider(
    settings: &[ProviderSettings],
    preferred: Option<ProviderKind>,
) -> Option<Provider> {
    let configured = |kind: ProviderKind| {
        settings
            .iter()
            .find(|s| s.kind() == kind && s.is_configured())
    };
    preferred
        .and_then(configured)
        .or_else(|| ProviderKind::PRIORITY.into_iter().find_map(configured))
        .map(ProviderSettings::to_provider)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 2048 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Usage,
}

/// A fully-shaped JSON POST to a vendor or the compile service.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// Carries a [`JsonRequest`] to its endpoint and returns the decoded JSON body.
///
/// Implementations should return the body even for error statuses when the
/// server sends a JSON error object, so the caller can report its message.
pub trait Transport {
    fn post_json(
        &self,
        request: &JsonRequest,
    ) -> impl Future<Output = std::result::Result<Value, BoxedError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gemini {
    api_key: String,
    model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ollama {
    endpoint: String,
    model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAi {
    api_key: String,
    model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anthropic {
    api_key: String,
    model: String,
}

/// A configured chat vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Gemini(Gemini),
    Ollama(Ollama),
    OpenAi(OpenAi),
    Anthropic(Anthropic),
}

impl Provider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Gemini(_) => ProviderKind::Gemini,
            Provider::Ollama(_) => ProviderKind::Ollama,
            Provider::OpenAi(_) => ProviderKind::OpenAi,
            Provider::Anthropic(_) => ProviderKind::Anthropic,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Gemini(p) => &p.model,
            Provider::Ollama(p) => &p.model,
            Provider::OpenAi(p) => &p.model,
            Provider::Anthropic(p) => &p.model,
        }
    }

    pub fn is_configured(&self) -> bool {
        match self {
            Provider::Ollama(p) => !p.endpoint.is_empty(),
            Provider::Gemini(Gemini { api_key, .. })
            | Provider::OpenAi(OpenAi { api_key, .. })
            | Provider::Anthropic(Anthropic { api_key, .. }) => !api_key.is_empty(),
        }
    }

    /// Builds the vendor-specific request for `messages`.
    pub fn request(&self, messages: &[ChatMessage], options: &ChatOptions) -> JsonRequest {
        match self {
            Provider::Gemini(p) => p.request(messages, options),
            Provider::Ollama(p) => p.request(messages, options),
            Provider::OpenAi(p) => p.request(messages, options),
            Provider::Anthropic(p) => p.request(messages, options),
        }
    }

    /// Reads the reply text and token usage out of a vendor response body.
    pub fn parse_response(&self, body: &Value) -> Result<ChatResponse> {
        if let Some(message) = api_error(body) {
            return Err(Error::Api { provider: self.kind(), message });
        }
        let parsed = match self {
            Provider::Gemini(_) => parse_gemini(body),
            Provider::Ollama(_) => parse_ollama(body),
            Provider::OpenAi(_) => parse_openai(body),
            Provider::Anthropic(_) => parse_anthropic(body),
        };
        parsed.map_err(|message| Error::MalformedResponse { provider: self.kind(), message })
    }

    /// Sends `messages` through `transport` and returns the reply.
    ///
    /// # Errors
    ///
    /// `NotConfigured` before any request is made, `Transport` when the
    /// transport fails, `Api` or `MalformedResponse` for unusable replies.
    pub async fn chat<T: Transport>(
        &self,
        transport: &T,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse> {
        if !self.is_configured() {
            return Err(Error::NotConfigured(self.kind()));
        }
        let request = self.request(messages, options);
        debug!(provider = self.kind().as_str(), model = self.model(), messages = messages.len(), "sending chat request");
        let body = transport
            .post_json(&request)
            .await
            .map_err(|source| Error::Transport { provider: self.kind(), source })?;
        let response = self.parse_response(&body)?;
        debug!(provider = self.kind().as_str(), total_tokens = response.usage.total_tokens, "chat reply received");
        Ok(response)
    }
}

fn system_prompt(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .find(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
}

fn wire_messages<'a>(messages: impl Iterator<Item = &'a ChatMessage>) -> Vec<Value> {
    messages
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect()
}

impl Gemini {
    fn request(&self, messages: &[ChatMessage], options: &ChatOptions) -> JsonRequest {
        let contents: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = if m.role == Role::Assistant { "model" } else { "user" };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();
        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_tokens,
            },
        });
        if let Some(system) = system_prompt(messages) {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        JsonRequest {
            url: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
                self.model, self.api_key
            ),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body,
        }
    }
}

impl Ollama {
    fn request(&self, messages: &[ChatMessage], options: &ChatOptions) -> JsonRequest {
        JsonRequest {
            url: format!("{}/api/chat", self.endpoint),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: json!({
                "model": self.model,
                "messages": wire_messages(messages.iter()),
                "stream": false,
                "options": {
                    "temperature": options.temperature,
                    "num_predict": options.max_tokens,
                },
            }),
        }
    }
}

impl OpenAi {
    fn request(&self, messages: &[ChatMessage], options: &ChatOptions) -> JsonRequest {
        JsonRequest {
            url: "https://api.openai.com/v1/chat/completions".into(),
            headers: vec![
                ("Authorization".into(), format!("Bearer {}", self.api_key)),
                ("Content-Type".into(), "application/json".into()),
            ],
            body: json!({
                "model": self.model,
                "messages": wire_messages(messages.iter()),
                "temperature": options.temperature,
                "max_tokens": options.max_tokens,
            }),
        }
    }
}

impl Anthropic {
    fn request(&self, messages: &[ChatMessage], options: &ChatOptions) -> JsonRequest {
        let mut body = json!({
            "model": self.model,
            "messages": wire_messages(messages.iter().filter(|m| m.role != Role::System)),
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
        });
        if let Some(system) = system_prompt(messages) {
            body["system"] = json!(system);
        }
        JsonRequest {
            url: "https://api.anthropic.com/v1/messages".into(),
            headers: vec![
                ("x-api-key".into(), self.api_key.clone()),
                ("anthropic-version".into(), ANTHROPIC_VERSION.into()),
                ("Content-Type".into(), "application/json".into()),
            ],
            body,
        }
    }
}

/// Vendor error payloads: `{"error": "..."}` (Ollama) or `{"error": {"message": "..."}}`.
fn api_error(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    match error {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(
            other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| other.to_string()),
        ),
    }
}

fn text_at(body: &Value, pointer: &str) -> std::result::Result<String, String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| format!("missing `{pointer}`"))
}

fn count_at(body: &Value, pointer: &str) -> u64 {
    body.pointer(pointer).and_then(Value::as_u64).unwrap_or(0)
}

fn parse_gemini(body: &Value) -> std::result::Result<ChatResponse, String> {
    if body.pointer("/candidates/0").is_none() {
        return Err("no candidates in reply".into());
    }
    Ok(ChatResponse {
        content: text_at(body, "/candidates/0/content/parts/0/text")?,
        usage: Usage {
            prompt_tokens: count_at(body, "/usageMetadata/promptTokenCount"),
            completion_tokens: count_at(body, "/usageMetadata/candidatesTokenCount"),
            total_tokens: count_at(body, "/usageMetadata/totalTokenCount"),
        },
    })
}

fn parse_ollama(body: &Value) -> std::result::Result<ChatResponse, String> {
    let prompt_tokens = count_at(body, "/prompt_eval_count");
    let completion_tokens = count_at(body, "/eval_count");
    Ok(ChatResponse {
        content: text_at(body, "/message/content")?,
        usage: Usage { prompt_tokens, completion_tokens, total_tokens: prompt_tokens + completion_tokens },
    })
}

fn parse_openai(body: &Value) -> std::result::Result<ChatResponse, String> {
    Ok(ChatResponse {
        content: text_at(body, "/choices/0/message/content")?,
        usage: Usage {
            prompt_tokens: count_at(body, "/usage/prompt_tokens"),
            completion_tokens: count_at(body, "/usage/completion_tokens"),
            total_tokens: count_at(body, "/usage/total_tokens"),
        },
    })
}

fn parse_anthropic(body: &Value) -> std::result::Result<ChatResponse, String> {
    let prompt_tokens = count_at(body, "/usage/input_tokens");
    let completion_tokens = count_at(body, "/usage/output_tokens");
    Ok(ChatResponse {
        content: text_at(body, "/content/0/text")?,
        usage: Usage { prompt_tokens, completion_tokens, total_tokens: prompt_tokens + completion_tokens },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ]
    }

    #[test]
    fn settings_parse_as_tagged_union() {
        let settings: Vec<ProviderSettings> = serde_json::from_value(json!([
            { "type": "openai", "api_key": "sk" },
            { "type": "ollama" },
        ]))
        .unwrap();
        assert_eq!(
            settings[0],
            ProviderSettings::OpenAi { api_key: "sk".into(), model: DEFAULT_OPENAI_MODEL.into() }
        );
        assert_eq!(settings[1].kind(), ProviderKind::Ollama);
        assert!(settings[1].is_configured());
    }

    #[test]
    fn settings_read_from_toml_tables() {
        #[derive(Deserialize)]
        struct File {
            provider: Option<ProviderKind>,
            providers: Vec<ProviderSettings>,
        }
        let file: File = toml::from_str(
            r#"
            provider = "anthropic"

            [[providers]]
            type = "anthropic"
            api_key = "key"

            [[providers]]
            type = "ollama"
            endpoint = "http://gpu:11434"
            model = "mistral"
            "#,
        )
        .unwrap();
        assert_eq!(file.provider, Some(ProviderKind::Anthropic));
        assert_eq!(file.providers[0].kind(), ProviderKind::Anthropic);
        assert_eq!(file.providers[1].to_provider().model(), "mistral");
    }

    #[test]
    fn selection_prefers_explicit_then_priority() {
        let settings = vec![
            ProviderSettings::Anthropic { api_key: "a".into(), model: "m".into() },
            ProviderSettings::Gemini { api_key: "".into(), model: "g".into() },
            ProviderSettings::OpenAi { api_key: "o".into(), model: "m".into() },
        ];
        let picked = select_provider(&settings, Some(ProviderKind::Anthropic)).unwrap();
        assert_eq!(picked.kind(), ProviderKind::Anthropic);

        // Gemini has no key, so priority falls through to OpenAI.
        let picked = select_provider(&settings, None).unwrap();
        assert_eq!(picked.kind(), ProviderKind::OpenAi);

        let picked = select_provider(&settings, Some(ProviderKind::Gemini)).unwrap();
        assert_eq!(picked.kind(), ProviderKind::OpenAi);

        assert!(select_provider(&[], None).is_none());
    }

    #[test]
    fn ollama_endpoint_drops_trailing_slash() {
        let provider = ProviderSettings::Ollama {
            endpoint: "http://box:11434/".into(),
            model: "llama2".into(),
        }
        .to_provider();
        let request = provider.request(&conversation(), &ChatOptions::default());
        assert_eq!(request.url, "http://box:11434/api/chat");
        assert_eq!(request.body["stream"], json!(false));
        assert_eq!(request.body["options"]["num_predict"], json!(2048));
        assert_eq!(request.body["messages"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn gemini_maps_roles_and_system_instruction() {
        let provider = ProviderSettings::Gemini { api_key: "k".into(), model: "gemini-pro".into() }
            .to_provider();
        let request = provider.request(&conversation(), &ChatOptions::default());
        assert!(request.url.ends_with("gemini-pro:generateContent?key=k"));
        assert_eq!(request.body["contents"][1]["role"], json!("model"));
        assert_eq!(request.body["contents"].as_array().map(Vec::len), Some(2));
        assert_eq!(request.body["systemInstruction"]["parts"][0]["text"], json!("be brief"));
    }

    #[test]
    fn anthropic_separates_system_prompt() {
        let provider = ProviderSettings::Anthropic { api_key: "k".into(), model: "c".into() }
            .to_provider();
        let request = provider.request(&conversation(), &ChatOptions::default());
        assert_eq!(request.body["system"], json!("be brief"));
        assert_eq!(request.body["messages"][0]["role"], json!("user"));
        assert!(request
            .headers
            .iter()
            .any(|(k, v)| k == "anthropic-version" && v == ANTHROPIC_VERSION));
    }

    #[test]
    fn parses_vendor_replies() {
        let openai = ProviderSettings::OpenAi { api_key: "k".into(), model: "m".into() }.to_provider();
        let reply = openai
            .parse_response(&json!({
                "choices": [{ "message": { "content": "done" } }],
                "usage": { "prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7 }
            }))
            .unwrap();
        assert_eq!(reply.content, "done");
        assert_eq!(reply.usage.total_tokens, 7);

        let anthropic = ProviderSettings::Anthropic { api_key: "k".into(), model: "m".into() }.to_provider();
        let reply = anthropic
            .parse_response(&json!({
                "content": [{ "type": "text", "text": "ok" }],
                "usage": { "input_tokens": 2, "output_tokens": 5 }
            }))
            .unwrap();
        assert_eq!(reply.usage.total_tokens, 7);
    }

    #[test]
    fn reports_api_errors_and_missing_fields() {
        let gemini = ProviderSettings::Gemini { api_key: "k".into(), model: "m".into() }.to_provider();
        let err = gemini
            .parse_response(&json!({ "error": { "message": "quota exceeded" } }))
            .unwrap_err();
        assert!(matches!(err, Error::Api { ref message, .. } if message == "quota exceeded"));

        let err = gemini.parse_response(&json!({ "candidates": [] })).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { provider: ProviderKind::Gemini, .. }));
    }
}
