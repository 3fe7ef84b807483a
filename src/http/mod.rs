//! HTTP value types exchanged between the host and trigger functions.

mod request;
mod response;

pub use request::{HttpRequest, Method};
pub use response::{HttpResponse, StatusCode};
