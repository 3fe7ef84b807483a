//! Trigger function trait, invocation context and error type.

use crate::function::bindings::TriggerManifest;
use crate::function::log::{LogSink, TracingSink};
use crate::http::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Execution context for a single invocation.
#[derive(Clone)]
pub struct FunctionContext {
    /// Environment variables available to the function.
    pub env: HashMap<String, String>,
    /// Function name.
    pub function_name: String,
    /// Invocation ID for tracing.
    pub invocation_id: String,
    /// Diagnostic log sink.
    pub log: Arc<dyn LogSink>,
}

impl FunctionContext {
    /// Create a new function context logging through `tracing`.
    pub fn new(function_name: impl Into<String>, invocation_id: impl Into<String>) -> Self {
        let function_name = function_name.into();
        Self {
            env: HashMap::new(),
            log: Arc::new(TracingSink::new(function_name.clone())),
            function_name,
            invocation_id: invocation_id.into(),
        }
    }

    /// Replace the log sink.
    pub fn with_log(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    /// Get an environment variable.
    pub fn get_env(&self, key: &str) -> Option<&String> {
        self.env.get(key)
    }
}

impl Default for FunctionContext {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl std::fmt::Debug for FunctionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionContext")
            .field("env", &self.env)
            .field("function_name", &self.function_name)
            .field("invocation_id", &self.invocation_id)
            .finish_non_exhaustive()
    }
}

/// An HTTP-triggered function.
///
/// The host calls `invoke` once per incoming request and transmits the
/// returned response verbatim. Implementations hold no per-invocation state.
#[async_trait]
pub trait HttpFunction: Send + Sync {
    /// Handle one invocation.
    async fn invoke(
        &self,
        request: HttpRequest,
        ctx: &FunctionContext,
    ) -> Result<HttpResponse, FunctionError>;

    /// Get the function name.
    fn name(&self) -> &str;

    /// Trigger metadata, when the function was declared with one.
    ///
    /// The registry refuses methods the manifest does not list.
    fn manifest(&self) -> Option<&'static TriggerManifest> {
        None
    }
}

/// Function error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionError {
    /// Error message.
    pub message: String,
    /// HTTP status code reported to the client.
    pub code: u16,
}

impl FunctionError {
    /// Create a new internal error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 500,
        }
    }

    /// Create an error with a specific code.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(404, message)
    }

    /// Create a method not allowed error.
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::with_code(405, message)
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(400, message)
    }
}

impl std::fmt::Display for FunctionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for FunctionError {}

impl From<FunctionError> for HttpResponse {
    fn from(err: FunctionError) -> Self {
        HttpResponse::error(err.code, err.message)
    }
}

impl From<std::io::Error> for FunctionError {
    fn from(err: std::io::Error) -> Self {
        FunctionError::new(err.to_string())
    }
}

impl From<serde_json::Error> for FunctionError {
    fn from(err: serde_json::Error) -> Self {
        FunctionError::bad_request(err.to_string())
    }
}
