//! LaTeX assistant: prompt construction and reply handling.
//!
//! Requests that produce a whole new document (fix) are routed into the
//! [`SuggestionSession`] instead of overwriting the document, so every AI edit
//! goes through review.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::document::Document;
use crate::error::Result;
use crate::provider::{ChatMessage, ChatOptions, Provider, Role, Transport};
use crate::session::SuggestionSession;

pub const CHAT_SYSTEM_PROMPT: &str = "You are an expert LaTeX assistant. Help users write, debug, and fix LaTeX code. Provide clear, concise responses with code examples when appropriate.";

pub const FIX_SYSTEM_PROMPT: &str = "You are an expert LaTeX assistant. When asked to fix code, provide only the corrected LaTeX code without explanations or markdown formatting.";

/// Change description attached to suggestions produced by [`Assistant::fix`].
pub const FIX_DESCRIPTION: &str = "Fix errors in the LaTeX code";

/// First fenced block, optionally tagged `latex`.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:latex)?\n(.*?)\n```").expect("fence pattern is valid")
});

fn fenced(document: &str) -> String {
    format!("```latex\n{document}\n```")
}

/// Pulls LaTeX source out of a model reply.
///
/// Uses the first fenced block when there is one, otherwise the whole reply;
/// either way the result is trimmed.
pub fn extract_latex(reply: &str) -> String {
    FENCED_BLOCK
        .captures(reply)
        .and_then(|c| c.get(1))
        .map_or(reply, |m| m.as_str())
        .trim()
        .to_owned()
}

/// Conversation state for the assistant panel.
///
/// Owns the chat history; the provider and transport are passed in per call.
#[derive(Debug, Default, Clone)]
pub struct Assistant {
    history: Vec<ChatMessage>,
    options: ChatOptions,
}

impl Assistant {
    pub fn new(options: ChatOptions) -> Self {
        Self { history: Vec::new(), options }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Messages for a plain question typed into the chat, without the document.
    pub fn chat_request(&self, text: &str) -> Vec<ChatMessage> {
        self.with_history(text.to_owned())
    }

    /// Messages for a free-form request about `document`.
    pub fn write_request(&self, document: &Document, instruction: &str) -> Vec<ChatMessage> {
        let prompt = format!(
            "Based on this LaTeX code, help me write:\n\n{}\n\n{instruction}",
            fenced(document.text())
        );
        self.with_history(prompt)
    }

    /// Messages asking the model to explain problems in `document`.
    pub fn debug_request(&self, document: &Document) -> Vec<ChatMessage> {
        let prompt = format!(
            "Debug this LaTeX code and explain any errors or potential issues:\n\n{}",
            fenced(document.text())
        );
        self.with_history(prompt)
    }

    /// Messages asking for a corrected copy of `document`, without history.
    pub fn fix_request(&self, document: &Document) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(FIX_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Fix any errors in this LaTeX code and provide the corrected version:\n\n{}\n\nProvide only the corrected LaTeX code without explanations.",
                fenced(document.text())
            )),
        ]
    }

    fn with_history(&self, prompt: String) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(prompt));
        messages
    }

    /// Sends a chat-style request and records both sides in the history.
    ///
    /// The final user message of `messages` goes into the history as sent, so
    /// later turns still see the document it quoted. Failures are recorded as
    /// an `Error: ...` reply before being returned.
    pub async fn send<T: Transport>(
        &mut self,
        provider: &Provider,
        transport: &T,
        messages: Vec<ChatMessage>,
    ) -> Result<String> {
        if let Some(prompt) = messages.iter().rev().find(|m| m.role == Role::User) {
            self.history.push(prompt.clone());
        }
        match provider.chat(transport, &messages, &self.options).await {
            Ok(reply) => {
                self.history.push(ChatMessage::assistant(reply.content.clone()));
                Ok(reply.content)
            }
            Err(e) => {
                warn!(provider = provider.kind().as_str(), error = %e, "assistant request failed");
                self.history.push(ChatMessage::assistant(format!("Error: {e}")));
                Err(e)
            }
        }
    }

    /// Asks for a fixed version of `document` and proposes it for review.
    ///
    /// The document itself is left untouched; accepting the pending suggestion
    /// is up to the caller.
    pub async fn fix<T: Transport>(
        &mut self,
        provider: &Provider,
        transport: &T,
        document: &Document,
        session: &mut SuggestionSession,
    ) -> Result<()> {
        let messages = self.fix_request(document);
        self.history.push(ChatMessage::user("Fix the LaTeX code"));
        let reply = match provider.chat(transport, &messages, &self.options).await {
            Ok(reply) => reply,
            Err(e) => {
                self.history.push(ChatMessage::assistant(format!("Error: {e}")));
                return Err(e);
            }
        };
        let fixed = extract_latex(&reply.content);
        info!(path = document.path(), bytes = fixed.len(), "fix proposed for review");
        session.propose(fixed, FIX_DESCRIPTION);
        self.history.push(ChatMessage::assistant(
            "A corrected version is ready for review.",
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tagged_and_untagged_fences() {
        assert_eq!(
            extract_latex("Here:\n```latex\n\\section{A}\n\\label{a}\n```\nthanks"),
            "\\section{A}\n\\label{a}"
        );
        assert_eq!(extract_latex("```\nplain\n```"), "plain");
        assert_eq!(extract_latex("  \\begin{document}\n"), "\\begin{document}");
    }

    #[test]
    fn first_fence_wins() {
        assert_eq!(extract_latex("```latex\none\n```\n```latex\ntwo\n```"), "one");
    }

    #[test]
    fn write_request_embeds_document_and_history() {
        let mut assistant = Assistant::default();
        assistant.history.push(ChatMessage::user("earlier"));
        let doc = Document::new("a.tex", "\\documentclass{article}");
        let messages = assistant.write_request(&doc, "add a title");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "earlier");
        assert!(messages[2].content.contains("```latex\n\\documentclass{article}\n```"));
        assert!(messages[2].content.ends_with("add a title"));
    }

    #[test]
    fn chat_request_sends_text_as_typed() {
        let mut assistant = Assistant::default();
        assistant.history.push(ChatMessage::user("earlier"));
        assistant.history.push(ChatMessage::assistant("reply"));
        let messages = assistant.chat_request("What does \\maketitle do?");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, CHAT_SYSTEM_PROMPT);
        assert_eq!(messages[3], ChatMessage::user("What does \\maketitle do?"));
    }

    #[test]
    fn fix_request_skips_history() {
        let mut assistant = Assistant::default();
        assistant.history.push(ChatMessage::user("earlier"));
        let messages = assistant.fix_request(&Document::new("a.tex", "x"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, FIX_SYSTEM_PROMPT);
    }
}
