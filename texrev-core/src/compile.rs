//! Client side of the remote LaTeX compile service.
//!
//! The service takes the main source plus any auxiliary project files and
//! answers with either a base64 PDF or a log and a list of located errors.
//! Like chat providers, the request goes through a caller-supplied
//! [`Transport`]. Compilation failures are values here, not errors: a broken
//! document, a refused connection and an unreadable reply all come back as
//! [`CompilationResult::Failure`] with a log the user can read.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::provider::{JsonRequest, Transport};

pub const DEFAULT_COMPILE_ENDPOINT: &str = "http://localhost:3001/api/compile";

/// A project file the main source may `\input` or `\include`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuxiliaryFile {
    pub name: String,
    pub content: String,
}

/// One compile job: the main source and the files it depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileRequest {
    source: String,
    files: Vec<AuxiliaryFile>,
}

impl CompileRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), files: Vec::new() }
    }

    /// Adds an auxiliary file; a later file with the same name replaces it.
    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let content = content.into();
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.content = content,
            None => self.files.push(AuxiliaryFile { name, content }),
        }
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn files(&self) -> &[AuxiliaryFile] {
        &self.files
    }

    /// The JSON POST for `endpoint`.
    pub fn to_request(&self, endpoint: &str) -> JsonRequest {
        JsonRequest {
            url: endpoint.to_owned(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: json!({ "latexCode": self.source, "files": self.files }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic the compiler attached to a source line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompilationError {
    pub line: u32,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationResult {
    Success { pdf_base64: String },
    Failure { log: String, errors: Vec<CompilationError> },
}

impl CompilationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CompilationResult::Success { .. })
    }

    fn failure(log: impl Into<String>) -> Self {
        CompilationResult::Failure { log: log.into(), errors: Vec::new() }
    }
}

/// Wire shape of the service's reply.
#[derive(Deserialize)]
struct CompileReply {
    #[serde(default)]
    success: bool,
    pdf: Option<String>,
    error: Option<String>,
    #[serde(default)]
    errors: Vec<CompilationError>,
}

/// Reads a compile service reply.
pub fn parse_compile_response(body: &Value) -> CompilationResult {
    let reply = match CompileReply::deserialize(body) {
        Ok(reply) => reply,
        Err(e) => return CompilationResult::failure(format!("malformed compile response: {e}")),
    };
    match (reply.success, reply.pdf) {
        (true, Some(pdf_base64)) => CompilationResult::Success { pdf_base64 },
        (true, None) => CompilationResult::failure("compile response is missing the PDF"),
        (false, _) => CompilationResult::Failure {
            log: reply.error.unwrap_or_else(|| "compilation failed".to_owned()),
            errors: reply.errors,
        },
    }
}

/// Sends `request` to the compile service at `endpoint`.
pub async fn compile<T: Transport>(
    transport: &T,
    endpoint: &str,
    request: &CompileRequest,
) -> CompilationResult {
    debug!(endpoint, bytes = request.source.len(), files = request.files.len(), "compiling");
    let result = match transport.post_json(&request.to_request(endpoint)).await {
        Ok(body) => parse_compile_response(&body),
        Err(e) => CompilationResult::failure(e.to_string()),
    };
    match &result {
        CompilationResult::Success { pdf_base64 } => {
            info!(bytes = pdf_base64.len(), "compiled");
        }
        CompilationResult::Failure { log, errors } => {
            warn!(errors = errors.len(), log = %log, "compilation failed");
        }
    }
    result
}
