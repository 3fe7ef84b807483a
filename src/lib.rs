//! # hello-trigger
//!
//! An HTTP-triggered `HelloWorld` function served by a Rust custom handler.
//!
//! The serverless platform owns the public endpoint and forwards every
//! trigger request to this process over plain HTTP. The host in
//! [`runtime`] turns the wire request into an [`HttpRequest`], hands it to
//! the registered [`HttpFunction`], and writes the returned
//! [`HttpResponse`] back unchanged.
//!
//! ```text
//!  client ──► platform (auth, TLS) ──► HostServer ──► FunctionRegistry ──► HelloWorld
//!                                       /api/{name}                        greet()
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hello_trigger::functions::HelloWorldFunction;
//! use hello_trigger::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let server = HostServer::new(HostConfig::from_env()?);
//!     server
//!         .register_function("HelloWorld", Box::new(HelloWorldFunction::new()))
//!         .await?;
//!     server.run().await
//! }
//! ```
//!
//! Handlers are pure: they read the request and return a response value.
//! The only side channel is the [`LogSink`](function::LogSink) reachable from
//! the [`FunctionContext`].

// Lets `#[http_function]` expansions inside this crate use absolute paths.
extern crate self as hello_trigger;

pub mod function;
pub mod functions;
pub mod http;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::function::{
        FunctionContext, FunctionDescriptor, FunctionError, FunctionRegistry, HttpFunction,
        LogSink, MemorySink, TriggerManifest,
    };
    pub use crate::http::{HttpRequest, HttpResponse, Method, StatusCode};
    pub use crate::runtime::{HostConfig, HostServer};
    pub use async_trait::async_trait;
    pub use hello_trigger_macro::http_function;
}

pub use function::{FunctionContext, FunctionError, FunctionRegistry, HttpFunction};
pub use http::{HttpRequest, HttpResponse};
pub use runtime::{HostConfig, HostServer};
