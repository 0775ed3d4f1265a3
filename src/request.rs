//! Request descriptors
//!
//! A `RequestDescriptor` is the immutable description of one logical call.
//! Continuation fields are layered on at send time by [`RequestDescriptor::outbound`].

use crate::error::{Error, Result};
use crate::http::OutboundRequest;
use crate::state::Continuation;
use crate::types::{BodyMode, Method, OptionStringExt, StringMap};

/// Parameter names reserved for continuation state
pub const CONTINUATION_PARAMS: [&str; 2] = ["cursor", "max_id"];

/// Immutable description of a logical API request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,
    /// Fully-qualified target URL
    pub url: String,
    /// Query or body parameters, excluding continuation fields
    pub params: StringMap,
    /// Body encoding for methods that send a body
    pub body_mode: BodyMode,
    /// Continuation values supplied explicitly by the caller
    pub explicit: Continuation,
}

impl RequestDescriptor {
    /// Create a descriptor with no parameters
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a parameter
    ///
    /// `cursor` and `max_id` are lifted out of the parameters and become the
    /// explicit starting continuation. An empty value means "not set".
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_param(key.into(), value.into());
        self
    }

    /// Add several parameters
    #[must_use]
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in params {
            self.insert_param(key.into(), value.into());
        }
        self
    }

    /// Set the body encoding
    #[must_use]
    pub fn body_mode(mut self, mode: BodyMode) -> Self {
        self.body_mode = mode;
        self
    }

    fn insert_param(&mut self, key: String, value: String) {
        match key.as_str() {
            "cursor" => self.explicit.cursor = value.none_if_empty(),
            "max_id" => self.explicit.max_id = value.none_if_empty(),
            _ => {
                self.params.insert(key, value);
            }
        }
    }

    /// Body encoding that actually reaches the wire, if any
    pub fn effective_body_mode(&self) -> Option<BodyMode> {
        if self.method.sends_query() {
            None
        } else {
            Some(self.body_mode)
        }
    }

    /// Build the wire request for the given continuation
    ///
    /// Continuation fields always travel in the query string; only fields
    /// that are set are sent.
    pub fn outbound(&self, continuation: &Continuation) -> OutboundRequest {
        let mut query = StringMap::new();
        let mut body = StringMap::new();

        if self.method.sends_query() {
            query.extend(self.params.clone());
        } else {
            body.extend(self.params.clone());
        }

        for (key, value) in continuation.params() {
            query.insert(key.to_string(), value.to_string());
        }

        OutboundRequest {
            method: self.method,
            url: self.url.clone(),
            query,
            body,
            body_mode: self.effective_body_mode(),
        }
    }
}

/// Parse a `key=value` data option
pub fn parse_param(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::invalid_value(
            "data",
            format!("expected key=value, got '{raw}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_param_lifts_continuation_fields() {
        let request = RequestDescriptor::new(Method::GET, "https://api.example.com/items")
            .param("screen_name", "rustlang")
            .param("cursor", "abc")
            .param("max_id", "99");

        assert_eq!(request.params.len(), 1);
        assert_eq!(request.params.get("screen_name").unwrap(), "rustlang");
        assert_eq!(
            request.explicit,
            Continuation::with(Some("abc".into()), Some("99".into()))
        );
    }

    #[test]
    fn test_empty_continuation_param_is_unset() {
        let request = RequestDescriptor::new(Method::GET, "https://api.example.com/items")
            .param("cursor", "")
            .param("max_id", "");

        assert!(request.explicit.is_empty());
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_outbound_get_uses_query() {
        let request = RequestDescriptor::new(Method::GET, "https://api.example.com/items")
            .param("count", "200");

        let outbound = request.outbound(&Continuation::from_cursor("next"));

        assert_eq!(outbound.method, Method::GET);
        assert_eq!(outbound.query.get("count").unwrap(), "200");
        assert_eq!(outbound.query.get("cursor").unwrap(), "next");
        assert!(!outbound.query.contains_key("max_id"));
        assert!(outbound.body.is_empty());
        assert_eq!(outbound.body_mode, None);
    }

    #[test]
    fn test_outbound_post_uses_body() {
        let request = RequestDescriptor::new(Method::POST, "https://api.example.com/items")
            .param("status", "hello")
            .body_mode(BodyMode::Json);

        let outbound = request.outbound(&Continuation::from_max_id("5"));

        assert_eq!(outbound.body.get("status").unwrap(), "hello");
        assert_eq!(outbound.query.get("max_id").unwrap(), "5");
        assert_eq!(outbound.query.len(), 1);
        assert_eq!(outbound.body_mode, Some(BodyMode::Json));
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("count=200").unwrap(),
            ("count".to_string(), "200".to_string())
        );
        assert_eq!(
            parse_param("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_param("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }
}
