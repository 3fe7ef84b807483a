//! Function registry used by the host to dispatch invocations.

use crate::function::handler::{FunctionContext, FunctionError, HttpFunction};
use crate::function::log::LogSink;
use crate::http::{HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Registry of HTTP-triggered functions, keyed by case-insensitive name.
pub struct FunctionRegistry {
    /// Registered functions, keyed by lower-cased name.
    functions: RwLock<HashMap<String, Arc<dyn HttpFunction>>>,
    /// Global environment variables.
    global_env: HashMap<String, String>,
    /// Sink handed to every invocation; `tracing` when unset.
    log: Option<Arc<dyn LogSink>>,
}

impl FunctionRegistry {
    /// Create a new function registry.
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
            global_env: HashMap::new(),
            log: None,
        }
    }

    /// Create a new function registry with global environment variables.
    pub fn with_env(env: HashMap<String, String>) -> Self {
        Self {
            global_env: env,
            ..Self::new()
        }
    }

    /// Route every invocation's diagnostic lines to `log`.
    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = Some(log);
        self
    }

    /// Register a new function.
    pub async fn register(
        &self,
        name: impl Into<String>,
        function: Box<dyn HttpFunction>,
    ) -> Result<(), FunctionError> {
        let name = name.into();
        let key = name.to_ascii_lowercase();
        let mut functions = self.functions.write().await;

        if functions.contains_key(&key) {
            return Err(FunctionError::new(format!(
                "Function '{}' is already registered",
                name
            )));
        }

        functions.insert(key, Arc::from(function));
        info!("Registered function: {}", name);
        Ok(())
    }

    /// Whether a function with this name is registered.
    pub async fn contains(&self, name: &str) -> bool {
        let functions = self.functions.read().await;
        functions.contains_key(&name.to_ascii_lowercase())
    }

    /// Invoke a function once.
    ///
    /// Methods missing from the function's manifest are refused with 405
    /// before the function runs.
    pub async fn execute(
        &self,
        name: &str,
        request: HttpRequest,
        invocation_id: &str,
    ) -> Result<HttpResponse, FunctionError> {
        let function = {
            let functions = self.functions.read().await;
            functions
                .get(&name.to_ascii_lowercase())
                .cloned()
                .ok_or_else(|| FunctionError::not_found(format!("Function '{}' not found", name)))?
        };

        if let Some(manifest) = function.manifest() {
            let method = request.method.to_string();
            if !manifest.accepts(&method) {
                return Err(FunctionError::method_not_allowed(format!(
                    "Function '{}' does not accept {}",
                    function.name(),
                    method
                )));
            }
        }

        let context = self.context_for(function.name(), invocation_id);
        debug!(
            "Invoking function '{}' [{}]",
            context.function_name, invocation_id
        );
        function.invoke(request, &context).await
    }

    /// List all registered function names, sorted.
    pub async fn list(&self) -> Vec<String> {
        let functions = self.functions.read().await;
        let mut names: Vec<String> = functions.values().map(|f| f.name().to_string()).collect();
        names.sort();
        names
    }

    /// Remove a function from the registry.
    pub async fn remove(&self, name: &str) -> Result<(), FunctionError> {
        let mut functions = self.functions.write().await;
        functions
            .remove(&name.to_ascii_lowercase())
            .ok_or_else(|| FunctionError::not_found(format!("Function '{}' not found", name)))?;

        info!("Removed function: {}", name);
        Ok(())
    }

    fn context_for(&self, function_name: &str, invocation_id: &str) -> FunctionContext {
        let mut context = FunctionContext::new(function_name, invocation_id);
        for (k, v) in &self.global_env {
            context.env.insert(k.clone(), v.clone());
        }
        if let Some(log) = &self.log {
            context.log = log.clone();
        }
        context
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
