//! Decoded inbound requests.
//!
//! The transport turns raw bytes into a [`Request`]; everything after that is
//! kindred's business.

use crate::error::RestError;
use serde_json::Value;
use std::{fmt, str::FromStr};

/// The request methods a route can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    /// Read a resource or collection.
    Get,
    /// Create or replace state.
    Put,
    /// Create state or trigger an action.
    Post,
    /// Remove state.
    Delete,
}

impl Verb {
    /// All verbs, in slot order.
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Put, Verb::Post, Verb::Delete];

    /// Upper-case method name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Put => "PUT",
            Verb::Post => "POST",
            Verb::Delete => "DELETE",
        }
    }

    /// Dense index used by per-verb slot arrays.
    pub const fn slot(self) -> usize {
        match self {
            Verb::Get => 0,
            Verb::Put => 1,
            Verb::Post => 2,
            Verb::Delete => 3,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RestError::BadRequest(format!("unsupported method `{s}`")))
    }
}

/// Ordered query parameters. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// An empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b&a=2` as form data. A key without `=` gets an empty
    /// value and `+` stands for a space.
    pub fn parse(raw: &str) -> Result<Self, RestError> {
        let mut pairs = Vec::new();
        for part in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            pairs.push((decode_form(key)?, decode_form(value)?));
        }
        Ok(Self(pairs))
    }

    /// Append a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` occurs at all.
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Iterate over all pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A decoded request as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Request method.
    pub verb: Verb,
    /// Percent-decoded, non-empty path segments.
    pub segments: Vec<String>,
    /// Query parameters.
    pub query: Query,
    /// Decoded JSON body, if any.
    pub body: Option<Value>,
}

impl Request {
    /// Build a request from a verb and already split segments.
    pub fn new<I, S>(verb: Verb, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            verb,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Query::new(),
            body: None,
        }
    }

    /// Parse a request target such as `/changes/1/revisions?o=FILES`.
    ///
    /// Empty segments are dropped, so `//changes/` and `changes` are the same
    /// path. Each segment is percent-decoded after splitting, which keeps
    /// encoded slashes (`%2F`) inside a single identifier.
    pub fn parse(verb: Verb, target: &str) -> Result<Self, RestError> {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            verb,
            segments,
            query: Query::parse(query)?,
            body: None,
        })
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// The path rebuilt from its segments, for logs and error messages.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

fn decode(raw: &str) -> Result<String, RestError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|e| RestError::BadRequest(format!("invalid percent-encoding in `{raw}`: {e}")))
}

/// Query components only; a literal `+` in a path segment stays a `+`.
fn decode_form(raw: &str) -> Result<String, RestError> {
    if raw.contains('+') {
        decode(&raw.replace('+', " "))
    } else {
        decode(raw)
    }
}
