//! Functions shipped with the host.

pub mod hello_world;

pub use hello_world::{greet, resolve_subject, HelloWorldFunction, HELLO_WORLD_MANIFEST};
