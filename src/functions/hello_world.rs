//! `HelloWorld`: greets the caller by name.
//!
//! The subject comes from the `name` query parameter, then from the `name`
//! field of a JSON body, and finally falls back to `"World"`. Presence is
//! what counts: an empty `?name=` wins over a body name and over the default.

use crate::function::{FunctionContext, FunctionError, LogSink};
use crate::http::{HttpRequest, HttpResponse};
use hello_trigger_macro::http_function;

/// Subject used when the request names nobody.
pub const DEFAULT_SUBJECT: &str = "World";

/// Fixed line written to the log sink on every invocation.
pub const PROCESSED_MESSAGE: &str = "JavaScript HTTP trigger function processed a request.";

/// Value of the `X-Function-Name` response header.
pub const FUNCTION_NAME: &str = "HelloWorld";

/// Pick the greeting subject for a request.
pub fn resolve_subject(request: &HttpRequest) -> String {
    if let Some(name) = request.get_query("name") {
        return name.clone();
    }
    request
        .body_field("name")
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string())
}

/// Build the greeting response, writing one line to `log`.
pub fn greet(request: &HttpRequest, log: &dyn LogSink) -> HttpResponse {
    log.log(PROCESSED_MESSAGE);

    let subject = resolve_subject(request);
    HttpResponse::text(format!(
        "Hello, {}. This HTTP triggered function executed successfully.",
        subject
    ))
    .header("X-Function-Name", FUNCTION_NAME)
}

#[http_function(name = "HelloWorld", auth_level = "anonymous", methods = "GET,POST")]
pub async fn hello_world(
    req: HttpRequest,
    ctx: &FunctionContext,
) -> Result<HttpResponse, FunctionError> {
    Ok(greet(&req, ctx.log.as_ref()))
}
