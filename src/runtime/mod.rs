//! Custom handler host: the HTTP server the serverless platform forwards
//! trigger requests to.

mod config;
mod server;

pub use config::{ConfigError, HostConfig};
pub use server::HostServer;
