//! Host HTTP server.

use crate::function::{FunctionError, FunctionRegistry, HttpFunction, LogSink};
use crate::http::{HttpRequest, HttpResponse, Method, StatusCode};
use crate::runtime::HostConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

static INVOCATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Pause after a failed accept before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Custom handler host.
///
/// Translates each incoming HTTP request addressed to
/// `{route_prefix}/{function}` into an [`HttpRequest`], invokes the
/// registered function and writes its [`HttpResponse`] back to the wire.
pub struct HostServer {
    /// Server configuration.
    config: HostConfig,
    /// Function registry.
    registry: Arc<FunctionRegistry>,
}

impl HostServer {
    /// Create a new host server.
    pub fn new(config: HostConfig) -> Self {
        let registry = Arc::new(FunctionRegistry::with_env(config.env.clone()));
        Self { config, registry }
    }

    /// Create a host server whose functions log to `log`.
    pub fn with_log_sink(config: HostConfig, log: Arc<dyn LogSink>) -> Self {
        let registry =
            Arc::new(FunctionRegistry::with_env(config.env.clone()).with_log_sink(log));
        Self { config, registry }
    }

    /// Get the configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Register a function with the server.
    pub async fn register_function(
        &self,
        name: impl Into<String>,
        function: Box<dyn HttpFunction>,
    ) -> Result<(), FunctionError> {
        self.registry.register(name, function).await
    }

    /// Bind the configured address and serve until the process exits.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections accepted from an already bound listener.
    ///
    /// Failed accepts are logged and retried.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Host listening on {}", listener.local_addr()?);

        let registry = self.registry.clone();
        let config = Arc::new(self.config);

        loop {
            let (stream, remote_addr) = accept_retrying(|| listener.accept()).await;
            let io = TokioIo::new(stream);

            let registry = registry.clone();
            let config = config.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let registry = registry.clone();
                    let config = config.clone();
                    async move { handle_request(req, registry, config, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Accept the next connection, retrying past transient errors such as
/// EMFILE or ECONNABORTED.
async fn accept_retrying<F, Fut, T>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
    }
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    registry: Arc<FunctionRegistry>,
    config: Arc<HostConfig>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path().to_string();
    let invocation_id = generate_invocation_id();

    debug!(
        "Handling request: {} {} from {} [{}]",
        req.method(),
        path,
        remote_addr,
        invocation_id
    );

    if config.enable_health && path == config.health_path {
        return Ok(build_response(HttpResponse::text("OK")));
    }

    let Some((function_name, sub_path)) = split_route(&path, &config.route_prefix) else {
        return Ok(build_response(HttpResponse::error(
            StatusCode::NOT_FOUND,
            "No function specified",
        )));
    };

    let request = match convert_request(req, &sub_path, config.max_body_size).await {
        Ok(request) => request,
        Err(response) => return Ok(build_response(response)),
    };

    match registry
        .execute(&function_name, request, &invocation_id)
        .await
    {
        Ok(response) => Ok(build_response(response)),
        Err(e) => {
            error!(
                "Function '{}' error: {} [{}]",
                function_name, e, invocation_id
            );
            Ok(build_response(e.into()))
        }
    }
}

/// Split `{prefix}/{function}/{rest}` into the function name and `/{rest}`.
fn split_route(path: &str, prefix: &str) -> Option<(String, String)> {
    let rest = path.strip_prefix(prefix)?;
    let rest = rest.strip_prefix('/')?;

    let mut parts = rest.splitn(2, '/');
    let function_name = parts.next().filter(|name| !name.is_empty())?;
    let sub_path = format!("/{}", parts.next().unwrap_or_default());
    Some((function_name.to_string(), sub_path))
}

/// Decode a query string; the first occurrence of a key wins.
fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    params
}

/// Convert a hyper request into an [`HttpRequest`].
async fn convert_request(
    req: Request<Incoming>,
    path: &str,
    max_body_size: usize,
) -> Result<HttpRequest, HttpResponse> {
    let method = Method::try_from(req.method()).map_err(HttpResponse::from)?;
    let query = parse_query(req.uri().query());

    let mut headers = HashMap::new();
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_string(), v.to_string());
        }
    }

    let body_bytes = match Limited::new(req.into_body(), max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!("Request body exceeds {} bytes", max_body_size);
            return Err(HttpResponse::error(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
            ));
        }
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return Err(HttpResponse::error(StatusCode::BAD_REQUEST, e.to_string()));
        }
    };

    Ok(HttpRequest {
        method,
        url: path.to_string(),
        headers,
        query,
        body: (!body_bytes.is_empty()).then_some(body_bytes),
    })
}

/// Build a hyper response from an [`HttpResponse`].
fn build_response(response: HttpResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(response.status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 500 Internal Server Error",
            response.status.0
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut builder = Response::builder().status(status);
    for (name, value) in response.headers {
        builder = builder.header(name, value);
    }

    builder
        .body(Full::new(Bytes::from(response.body)))
        .unwrap_or_else(|e| {
            error!("Failed to build response: {}", e);
            let mut fallback = Response::new(Full::new(Bytes::from_static(b"Internal Server Error")));
            *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

/// Generate a unique invocation ID.
fn generate_invocation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let sequence = INVOCATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", timestamp, sequence)
}
