//! Integration tests for the HelloWorld trigger and its host.

use hello_trigger::functions::{HelloWorldFunction, HELLO_WORLD_MANIFEST};
use hello_trigger::prelude::*;
use std::sync::Arc;

const PROCESSED: &str = "JavaScript HTTP trigger function processed a request.";

/// Registry with HelloWorld registered and every log line captured.
async fn hello_registry() -> (FunctionRegistry, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let registry = FunctionRegistry::new().with_log_sink(sink.clone());
    registry
        .register("HelloWorld", Box::new(HelloWorldFunction::new()))
        .await
        .unwrap();
    (registry, sink)
}

async fn invoke(request: HttpRequest) -> (HttpResponse, Arc<MemorySink>) {
    let (registry, sink) = hello_registry().await;
    let response = registry
        .execute("HelloWorld", request, "inv-123")
        .await
        .unwrap();
    (response, sink)
}

fn assert_greets(response: &HttpResponse, subject: &str) {
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        format!(
            "Hello, {}. This HTTP triggered function executed successfully.",
            subject
        )
    );
}

#[tokio::test]
async fn test_default_subject() {
    let (response, _) = invoke(HttpRequest::default().body("{}")).await;

    assert_eq!(
        response.body,
        "Hello, World. This HTTP triggered function executed successfully."
    );
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.get_header("Content-Type"),
        Some(&"text/plain".to_string())
    );
    assert_eq!(
        response.get_header("X-Function-Name"),
        Some(&"HelloWorld".to_string())
    );
}

#[tokio::test]
async fn test_name_from_query() {
    let (response, _) = invoke(HttpRequest::default().query_param("name", "John")).await;
    assert_greets(&response, "John");
}

#[tokio::test]
async fn test_name_from_body() {
    let request = HttpRequest::new(Method::Post, "/")
        .json_body(&serde_json::json!({ "name": "Jane" }))
        .unwrap();
    let (response, _) = invoke(request).await;
    assert_greets(&response, "Jane");
}

#[tokio::test]
async fn test_empty_query_name() {
    let (response, _) = invoke(HttpRequest::default().query_param("name", "")).await;
    assert_eq!(
        response.body,
        "Hello, . This HTTP triggered function executed successfully."
    );
}

#[tokio::test]
async fn test_query_precedence_over_body() {
    let request = HttpRequest::new(Method::Post, "/")
        .query_param("name", "A")
        .body(r#"{"name": "B"}"#);
    let (response, _) = invoke(request).await;
    assert_greets(&response, "A");
}

#[tokio::test]
async fn test_absent_query_and_body() {
    let request: HttpRequest = serde_json::from_str("{}").unwrap();
    let (response, _) = invoke(request).await;
    assert_greets(&response, "World");
}

#[tokio::test]
async fn test_logs_exactly_once_per_invocation() {
    let (registry, sink) = hello_registry().await;

    let requests = vec![
        HttpRequest::default(),
        HttpRequest::default().query_param("name", "John"),
        HttpRequest::default().body(r#"{"name": "Jane"}"#),
        HttpRequest::default().query_param("name", ""),
    ];
    let count = requests.len();

    for request in requests {
        let before = sink.len();
        registry
            .execute("HelloWorld", request, "inv-1")
            .await
            .unwrap();
        assert_eq!(sink.len(), before + 1);
    }

    assert_eq!(sink.messages(), vec![PROCESSED; count]);
}

#[tokio::test]
async fn test_headers_fixed_for_every_subject() {
    for name in ["", "John", "Ünïcödé", "a b"] {
        let (response, _) = invoke(HttpRequest::default().query_param("name", name)).await;
        assert_greets(&response, name);
        assert_eq!(response.headers.len(), 2);
        assert_eq!(response.headers["Content-Type"], "text/plain");
        assert_eq!(response.headers["X-Function-Name"], "HelloWorld");
    }
}

// A second function declared through the macro.
#[http_function(name = "Shout", auth_level = "function", methods = "post", route = "shout/{word}")]
async fn shout(req: HttpRequest, ctx: &FunctionContext) -> Result<HttpResponse, FunctionError> {
    ctx.log.log("shouting");
    let word = req
        .body_field("word")
        .ok_or_else(|| FunctionError::bad_request("missing word"))?;
    Ok(HttpResponse::text(word.to_uppercase()))
}

#[tokio::test]
async fn test_macro_manifest() {
    let manifest = ShoutFunction::manifest();
    assert_eq!(manifest.name, "Shout");
    assert_eq!(manifest.auth_level, "function");
    assert_eq!(manifest.methods, &["POST"]);
    assert_eq!(manifest.route, "shout/{word}");

    let descriptor = FunctionDescriptor::from_manifest(manifest).unwrap();
    descriptor.validate().unwrap();
    let trigger = descriptor.trigger().unwrap();
    assert_eq!(trigger.route.as_deref(), Some("shout/{word}"));
    assert_eq!(trigger.methods, Some(vec!["post".to_string()]));
}

#[tokio::test]
async fn test_macro_function_errors_propagate() {
    let registry = FunctionRegistry::new();
    registry
        .register("Shout", Box::new(ShoutFunction::new()))
        .await
        .unwrap();

    let ok = registry
        .execute(
            "shout",
            HttpRequest::new(Method::Post, "/").body(r#"{"word": "hey"}"#),
            "inv-1",
        )
        .await
        .unwrap();
    assert_eq!(ok.body, "HEY");

    let err = registry
        .execute("Shout", HttpRequest::new(Method::Post, "/"), "inv-2")
        .await
        .unwrap_err();
    assert_eq!(err.code, 400);
    let response: HttpResponse = err.into();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unlisted_method_refused_before_invoke() {
    let (registry, sink) = hello_registry().await;

    for method in [Method::Put, Method::Delete, Method::Patch] {
        let err = registry
            .execute(
                "HelloWorld",
                HttpRequest::new(method, "/").query_param("name", "X"),
                "inv-1",
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, 405);
    }
    assert!(sink.is_empty());

    let response = registry
        .execute("HelloWorld", HttpRequest::new(Method::Post, "/"), "inv-2")
        .await
        .unwrap();
    assert_greets(&response, "World");
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_functions_without_manifest_take_any_method() {
    struct Anything;

    #[async_trait]
    impl HttpFunction for Anything {
        async fn invoke(
            &self,
            request: HttpRequest,
            _ctx: &FunctionContext,
        ) -> Result<HttpResponse, FunctionError> {
            Ok(HttpResponse::text(request.method.to_string()))
        }

        fn name(&self) -> &str {
            "Anything"
        }
    }

    let registry = FunctionRegistry::new();
    registry.register("Anything", Box::new(Anything)).await.unwrap();

    let response = registry
        .execute("Anything", HttpRequest::new(Method::Delete, "/"), "inv-1")
        .await
        .unwrap();
    assert_eq!(response.body, "DELETE");
}

#[tokio::test]
async fn test_registry_duplicate_register() {
    let (registry, _) = hello_registry().await;

    let result = registry
        .register("helloworld", Box::new(HelloWorldFunction::new()))
        .await;

    assert!(result.is_err());
    assert_eq!(registry.list().await, vec!["HelloWorld".to_string()]);
}

#[tokio::test]
async fn test_registry_not_found() {
    let (registry, _) = hello_registry().await;

    let err = registry
        .execute("Missing", HttpRequest::default(), "inv-1")
        .await
        .unwrap_err();

    assert_eq!(err.code, 404);
}

#[tokio::test]
async fn test_registry_remove() {
    let (registry, _) = hello_registry().await;

    assert!(registry.contains("HELLOWORLD").await);
    registry.remove("HelloWorld").await.unwrap();
    assert!(!registry.contains("HelloWorld").await);
    assert!(registry.remove("HelloWorld").await.is_err());
}

#[tokio::test]
async fn test_registry_passes_env() {
    struct EnvEcho;

    #[async_trait]
    impl HttpFunction for EnvEcho {
        async fn invoke(
            &self,
            _request: HttpRequest,
            ctx: &FunctionContext,
        ) -> Result<HttpResponse, FunctionError> {
            let value = ctx.get_env("STAGE").cloned().unwrap_or_default();
            Ok(HttpResponse::text(format!("{}:{}", ctx.function_name, value)))
        }

        fn name(&self) -> &str {
            "EnvEcho"
        }
    }

    let env = [("STAGE".to_string(), "test".to_string())].into_iter().collect();
    let registry = FunctionRegistry::with_env(env);
    registry.register("EnvEcho", Box::new(EnvEcho)).await.unwrap();

    let response = registry
        .execute("envecho", HttpRequest::default(), "inv-1")
        .await
        .unwrap();
    assert_eq!(response.body, "EnvEcho:test");
}

#[test]
fn test_checked_in_function_json_matches_manifest() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/HelloWorld/function.json");
    let on_disk = FunctionDescriptor::from_path(path).unwrap();

    on_disk.validate().unwrap();
    assert_eq!(
        on_disk,
        FunctionDescriptor::from_manifest(&HELLO_WORLD_MANIFEST).unwrap()
    );
}

#[test]
fn test_bindings_subcommand_prints_function_json() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_hello-trigger"))
        .arg("bindings")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let printed = FunctionDescriptor::from_json(&stdout).unwrap();
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/HelloWorld/function.json");
    assert_eq!(printed, FunctionDescriptor::from_path(path).unwrap());
    assert!(stdout.contains("\"authLevel\": \"anonymous\""));
}

#[test]
fn test_hello_world_manifest() {
    assert_eq!(HELLO_WORLD_MANIFEST.name, "HelloWorld");
    assert_eq!(HELLO_WORLD_MANIFEST.auth_level, "anonymous");
    assert!(HELLO_WORLD_MANIFEST.accepts("GET"));
    assert!(HELLO_WORLD_MANIFEST.accepts("POST"));
}
