//! Incoming trigger request.

use crate::function::FunctionError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// HTTP method enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
            Method::Head => write!(f, "HEAD"),
            Method::Options => write!(f, "OPTIONS"),
        }
    }
}

impl TryFrom<&hyper::Method> for Method {
    type Error = FunctionError;

    fn try_from(method: &hyper::Method) -> Result<Self, Self::Error> {
        match *method {
            hyper::Method::GET => Ok(Method::Get),
            hyper::Method::POST => Ok(Method::Post),
            hyper::Method::PUT => Ok(Method::Put),
            hyper::Method::DELETE => Ok(Method::Delete),
            hyper::Method::PATCH => Ok(Method::Patch),
            hyper::Method::HEAD => Ok(Method::Head),
            hyper::Method::OPTIONS => Ok(Method::Options),
            _ => Err(FunctionError::method_not_allowed(format!(
                "Method {} is not supported",
                method
            ))),
        }
    }
}

/// Request handed to a trigger function for a single invocation.
///
/// `query` and `body` may both be absent on the wire. An absent query is an
/// empty map; an absent, empty or non-object body reads as an empty object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method.
    #[serde(default)]
    pub method: Method,
    /// Request path, relative to the route prefix.
    #[serde(default)]
    pub url: String,
    /// HTTP headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Decoded query string parameters.
    #[serde(default)]
    pub query: HashMap<String, String>,
    /// Raw request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a new request with no query, headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
            body: None,
        }
    }

    /// Add a query parameter to the request.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body to the JSON encoding of `value`.
    pub fn json_body<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.body(bytes))
    }

    /// Get a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&String> {
        self.query.get(key)
    }

    /// Parse the body as JSON if present.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.body.as_ref().map(|b| serde_json::from_slice(b))
    }

    /// The body as a JSON object.
    ///
    /// Anything that is not a JSON object, including a missing body or
    /// malformed JSON, yields an empty map.
    pub fn body_object(&self) -> Map<String, Value> {
        match self.json::<Value>() {
            Some(Ok(Value::Object(map))) => map,
            _ => Map::new(),
        }
    }

    /// Look up a field of the JSON body object, rendered as a string.
    ///
    /// Strings come back verbatim and `null` counts as absent. Numbers and
    /// booleans render as their literal text. Arrays and objects render as
    /// compact JSON, so `["a","b"]` stays `["a","b"]` rather than being
    /// joined into `a,b`, and an object never collapses to `[object Object]`.
    pub fn body_field(&self, key: &str) -> Option<String> {
        match self.body_object().remove(key)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}
