//! Trigger function contract, bindings and dispatch.

pub mod bindings;
pub mod handler;
pub mod log;
pub mod registry;

pub use bindings::{AuthLevel, Binding, BindingError, FunctionDescriptor, TriggerManifest};
pub use handler::{FunctionContext, FunctionError, HttpFunction};
pub use log::{LogSink, MemorySink, TracingSink};
pub use registry::FunctionRegistry;
