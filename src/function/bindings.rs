//! Trigger binding descriptors.
//!
//! A function declares how the host triggers it through a `function.json`
//! file: an HTTP input trigger carrying the authorization level and the
//! accepted methods, and an HTTP output binding the response is written to.
//! The `#[http_function]` macro records the same facts at compile time in a
//! [`TriggerManifest`], which renders to a [`FunctionDescriptor`].

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Binding type of the HTTP input trigger.
pub const HTTP_TRIGGER: &str = "httpTrigger";
/// Binding type of the HTTP output binding.
pub const HTTP_OUTPUT: &str = "http";

/// Authorization level required by an HTTP trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    #[default]
    Anonymous,
    Function,
    Admin,
}

impl std::str::FromStr for AuthLevel {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anonymous" => Ok(AuthLevel::Anonymous),
            "function" => Ok(AuthLevel::Function),
            "admin" => Ok(AuthLevel::Admin),
            _ => Err(BindingError::Invalid(format!("unknown auth level '{}'", s))),
        }
    }
}

/// Compile-time trigger metadata generated by `#[http_function]`.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerManifest {
    /// Function name; also the default route segment.
    pub name: &'static str,
    /// Authorization level, e.g. "anonymous".
    pub auth_level: &'static str,
    /// Accepted HTTP methods, upper case.
    pub methods: &'static [&'static str],
    /// Custom route template, empty for the default.
    pub route: &'static str,
}

impl TriggerManifest {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            auth_level: "anonymous",
            methods: &["GET", "POST"],
            route: "",
        }
    }

    /// Whether the trigger accepts the given method.
    pub fn accepts(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

/// Direction of a binding relative to the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// One entry of the `bindings` array in `function.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: String,
    pub direction: Direction,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_level: Option<AuthLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

/// Parsed `function.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub bindings: Vec<Binding>,
}

impl FunctionDescriptor {
    /// Build the canonical descriptor for a manifest: an `httpTrigger`
    /// input named `req` followed by an `http` output named `res`.
    pub fn from_manifest(manifest: &TriggerManifest) -> Result<Self, BindingError> {
        let auth_level: AuthLevel = manifest.auth_level.parse()?;
        let trigger = Binding {
            kind: HTTP_TRIGGER.to_string(),
            direction: Direction::In,
            name: "req".to_string(),
            auth_level: Some(auth_level),
            methods: Some(
                manifest
                    .methods
                    .iter()
                    .map(|m| m.to_ascii_lowercase())
                    .collect(),
            ),
            route: (!manifest.route.is_empty()).then(|| manifest.route.to_string()),
        };
        let output = Binding {
            kind: HTTP_OUTPUT.to_string(),
            direction: Direction::Out,
            name: "res".to_string(),
            auth_level: None,
            methods: None,
            route: None,
        };
        Ok(Self {
            bindings: vec![trigger, output],
        })
    }

    /// Parse a descriptor from JSON text.
    pub fn from_json(json: &str) -> Result<Self, BindingError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a `function.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BindingError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, BindingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The HTTP input trigger, if the first binding is one.
    pub fn trigger(&self) -> Option<&Binding> {
        self.bindings
            .first()
            .filter(|b| b.kind == HTTP_TRIGGER && b.direction == Direction::In)
    }

    /// Check the descriptor wires an HTTP trigger to an HTTP output.
    ///
    /// The first binding must be an `httpTrigger` input with an auth level;
    /// the second must be an `http` output.
    pub fn validate(&self) -> Result<(), BindingError> {
        if self.bindings.len() < 2 {
            return Err(BindingError::Invalid(format!(
                "expected at least 2 bindings, found {}",
                self.bindings.len()
            )));
        }

        let input = &self.bindings[0];
        if input.kind != HTTP_TRIGGER {
            return Err(BindingError::Invalid(format!(
                "first binding must be '{}', found '{}'",
                HTTP_TRIGGER, input.kind
            )));
        }
        if input.direction != Direction::In {
            return Err(BindingError::Invalid(
                "trigger binding must have direction 'in'".to_string(),
            ));
        }
        if input.auth_level.is_none() {
            return Err(BindingError::Invalid(
                "trigger binding is missing authLevel".to_string(),
            ));
        }

        let output = &self.bindings[1];
        if output.kind != HTTP_OUTPUT {
            return Err(BindingError::Invalid(format!(
                "second binding must be '{}', found '{}'",
                HTTP_OUTPUT, output.kind
            )));
        }
        if output.direction != Direction::Out {
            return Err(BindingError::Invalid(
                "output binding must have direction 'out'".to_string(),
            ));
        }

        Ok(())
    }
}

/// Error reading or validating a binding descriptor.
#[derive(Debug)]
pub enum BindingError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for BindingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingError::Io(e) => write!(f, "failed to read bindings: {}", e),
            BindingError::Parse(e) => write!(f, "failed to parse bindings: {}", e),
            BindingError::Invalid(msg) => write!(f, "invalid bindings: {}", msg),
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindingError::Io(e) => Some(e),
            BindingError::Parse(e) => Some(e),
            BindingError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for BindingError {
    fn from(err: std::io::Error) -> Self {
        BindingError::Io(err)
    }
}

impl From<serde_json::Error> for BindingError {
    fn from(err: serde_json::Error) -> Self {
        BindingError::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: TriggerManifest = TriggerManifest::new("Greeter");

    #[test]
    fn test_manifest_defaults() {
        assert_eq!(MANIFEST.auth_level, "anonymous");
        assert!(MANIFEST.accepts("get"));
        assert!(MANIFEST.accepts("POST"));
        assert!(!MANIFEST.accepts("DELETE"));
    }

    #[test]
    fn test_descriptor_from_manifest() {
        let descriptor = FunctionDescriptor::from_manifest(&MANIFEST).unwrap();
        descriptor.validate().unwrap();

        let trigger = descriptor.trigger().unwrap();
        assert_eq!(trigger.auth_level, Some(AuthLevel::Anonymous));
        assert_eq!(
            trigger.methods,
            Some(vec!["get".to_string(), "post".to_string()])
        );
        assert_eq!(trigger.route, None);
        assert_eq!(descriptor.bindings[1].kind, "http");
    }

    #[test]
    fn test_descriptor_json_field_names() {
        let descriptor = FunctionDescriptor::from_manifest(&MANIFEST).unwrap();
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["bindings"][0]["type"], "httpTrigger");
        assert_eq!(value["bindings"][0]["authLevel"], "anonymous");
        assert_eq!(value["bindings"][0]["direction"], "in");
        assert_eq!(value["bindings"][1]["type"], "http");
        assert!(value["bindings"][1].get("authLevel").is_none());
    }

    #[test]
    fn test_unknown_auth_level_rejected() {
        let manifest = TriggerManifest {
            auth_level: "public",
            ..TriggerManifest::new("Greeter")
        };
        assert!(matches!(
            FunctionDescriptor::from_manifest(&manifest),
            Err(BindingError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_order() {
        let json = r#"{"bindings": [
            {"type": "http", "direction": "out", "name": "res"},
            {"type": "httpTrigger", "direction": "in", "name": "req", "authLevel": "anonymous"}
        ]}"#;
        let descriptor = FunctionDescriptor::from_json(json).unwrap();
        assert!(descriptor.validate().is_err());
        assert!(descriptor.trigger().is_none());
    }

    #[test]
    fn test_validate_rejects_single_binding() {
        let json = r#"{"bindings": [
            {"type": "httpTrigger", "direction": "in", "name": "req", "authLevel": "function"}
        ]}"#;
        let descriptor = FunctionDescriptor::from_json(json).unwrap();
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            FunctionDescriptor::from_json("{"),
            Err(BindingError::Parse(_))
        ));
    }
}
