//! Custom handler binary.
//!
//! `hello-trigger` serves the registered functions on the port the platform
//! hands over in `FUNCTIONS_CUSTOMHANDLER_PORT`.
//! `hello-trigger bindings` prints the `function.json` for `HelloWorld`.

use hello_trigger::functions::{HelloWorldFunction, HELLO_WORLD_MANIFEST};
use hello_trigger::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if std::env::args().nth(1).as_deref() == Some("bindings") {
        let descriptor = FunctionDescriptor::from_manifest(&HELLO_WORLD_MANIFEST)?;
        println!("{}", descriptor.to_json_pretty()?);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = HostConfig::from_env()?;
    let server = HostServer::new(config);

    server
        .register_function(HELLO_WORLD_MANIFEST.name, Box::new(HelloWorldFunction::new()))
        .await?;

    tracing::info!(
        "Try: curl 'http://{}{}/{}?name=John'",
        server.config().bind_addr(),
        server.config().route_prefix,
        HELLO_WORLD_MANIFEST.name
    );

    server.run().await
}
