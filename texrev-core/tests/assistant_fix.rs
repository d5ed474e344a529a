//! Assistant and compile requests over a scripted transport.

use std::future::Future;
use std::sync::Mutex;

use serde_json::{json, Value};
use texrev_core::assistant::{Assistant, FIX_DESCRIPTION};
use texrev_core::compile::{compile, CompilationResult, CompileRequest};
use texrev_core::document::Document;
use texrev_core::error::BoxedError;
use texrev_core::provider::{
    ChatOptions, JsonRequest, ProviderKind, ProviderSettings, Role, Transport,
};
use texrev_core::session::SuggestionSession;
use texrev_core::Error;

/// Answers every request with the same body and keeps what it was sent.
struct ScriptedTransport {
    reply: Result<Value, String>,
    sent: Mutex<Vec<JsonRequest>>,
}

impl ScriptedTransport {
    fn replying(body: Value) -> Self {
        Self { reply: Ok(body), sent: Mutex::new(Vec::new()) }
    }

    fn failing(message: &str) -> Self {
        Self { reply: Err(message.to_owned()), sent: Mutex::new(Vec::new()) }
    }

    fn sent(&self) -> Vec<JsonRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn post_json(
        &self,
        request: &JsonRequest,
    ) -> impl Future<Output = Result<Value, BoxedError>> + Send {
        self.sent.lock().unwrap().push(request.clone());
        let reply = self.reply.clone().map_err(BoxedError::from);
        std::future::ready(reply)
    }
}

fn ollama() -> ProviderSettings {
    ProviderSettings::Ollama {
        endpoint: "http://localhost:11434/".into(),
        model: "llama2".into(),
    }
}

#[tokio::test]
async fn fix_proposes_extracted_code_for_review() {
    let provider = ollama().to_provider();
    let transport = ScriptedTransport::replying(json!({
        "message": { "role": "assistant", "content": "Sure:\n```latex\n\\section{Fixed}\n```" },
        "prompt_eval_count": 12,
        "eval_count": 5,
    }));
    let doc = Document::new("main.tex", "\\section{Broken");
    let mut session = SuggestionSession::default();
    let mut assistant = Assistant::new(ChatOptions::default());

    assistant.fix(&provider, &transport, &doc, &mut session).await.unwrap();

    let pending = session.pending().cloned().unwrap();
    assert_eq!(pending.suggested_text, "\\section{Fixed}");
    assert_eq!(pending.prompt, FIX_DESCRIPTION);
    assert_eq!(doc.text(), "\\section{Broken", "fix must not touch the document");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, "http://localhost:11434/api/chat");
    let user = sent[0].body["messages"][1]["content"].as_str().unwrap_or_default();
    assert!(user.contains("\\section{Broken"));

    let history = assistant.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[1].role, Role::Assistant);
}

#[tokio::test]
async fn unconfigured_provider_sends_nothing() {
    let provider = ProviderSettings::Gemini { api_key: String::new(), model: "gemini-pro".into() }
        .to_provider();
    let transport = ScriptedTransport::replying(json!({}));
    let mut session = SuggestionSession::default();
    let mut assistant = Assistant::default();

    let err = assistant
        .fix(&provider, &transport, &Document::new("a.tex", "x"), &mut session)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotConfigured(ProviderKind::Gemini)));
    assert!(transport.sent().is_empty());
    assert!(!session.is_pending());
}

#[tokio::test]
async fn transport_failure_is_recorded_in_history() {
    let provider = ollama().to_provider();
    let transport = ScriptedTransport::failing("connection refused");
    let mut assistant = Assistant::default();
    let doc = Document::new("a.tex", "x");

    let messages = assistant.debug_request(&doc);
    let err = assistant
        .send(&provider, &transport, messages)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { provider: ProviderKind::Ollama, .. }));
    let last = assistant.history().last().cloned().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.starts_with("Error: "));
    assert!(last.content.contains("connection refused"));
}

#[tokio::test]
async fn send_returns_reply_and_extends_conversation() {
    let provider = ProviderSettings::OpenAi { api_key: "sk-test".into(), model: "gpt-3.5-turbo".into() }
        .to_provider();
    let transport = ScriptedTransport::replying(json!({
        "choices": [{ "message": { "role": "assistant", "content": "Use \\maketitle." } }],
        "usage": { "prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7 },
    }));
    let mut assistant = Assistant::default();
    let doc = Document::new("a.tex", "\\title{T}");

    let first = assistant.write_request(&doc, "add a title page");
    let first_prompt = first[1].content.clone();
    let reply = assistant.send(&provider, &transport, first).await.unwrap();
    assert_eq!(reply, "Use \\maketitle.");

    // The follow-up carries the full earlier prompt, document included.
    let second = assistant.chat_request("and an abstract");
    assert_eq!(second.len(), 4);
    assert_eq!(second[1].content, first_prompt);
    assert!(second[1].content.contains("```latex\n\\title{T}\n```"));
    assert_eq!(second[2].content, "Use \\maketitle.");
    assert_eq!(second[3].content, "and an abstract");

    let sent = transport.sent();
    let auth = sent[0]
        .headers
        .iter()
        .find(|(name, _)| name == "Authorization")
        .map(|(_, value)| value.as_str());
    assert_eq!(auth, Some("Bearer sk-test"));
}

#[tokio::test]
async fn compile_posts_project_and_returns_pdf() {
    let transport = ScriptedTransport::replying(json!({ "success": true, "pdf": "JVBERi0xLjU=" }));
    let request = CompileRequest::new("\\documentclass{article}\n\\input{body}")
        .with_file("body.tex", "Hello.");

    let result = compile(&transport, "http://compile.local/api/compile", &request).await;

    assert_eq!(result, CompilationResult::Success { pdf_base64: "JVBERi0xLjU=".into() });
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, "http://compile.local/api/compile");
    assert_eq!(sent[0].body["files"][0]["name"], "body.tex");
}

#[tokio::test]
async fn unreachable_compile_service_is_a_failure_with_log() {
    let transport = ScriptedTransport::failing("connection refused");
    let result = compile(&transport, "http://compile.local/api/compile", &CompileRequest::new("x")).await;

    match result {
        CompilationResult::Failure { log, errors } => {
            assert_eq!(log, "connection refused");
            assert!(errors.is_empty());
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}
