//! Outbound responses and the status mapping rules.

use crate::{error::RestError, handler::Reply, request::Verb};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The error payload attached to failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code, e.g. `method_not_allowed`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// What the dispatcher hands back to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Success body.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub body: Option<Value>,
    /// Error payload.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorBody>,
}

impl Response {
    /// Translate a successful reply for a request made with `verb`.
    ///
    /// - GET → 200
    /// - DELETE → 204, body dropped
    /// - PUT/POST → 201 when the reply is declared created, 204 when it has
    ///   no body, 200 otherwise
    pub fn from_reply(verb: Verb, reply: Reply) -> Self {
        let created = reply.is_created();
        let body = reply.into_body();
        let (status, body) = match verb {
            Verb::Get => (200, body),
            Verb::Delete => (204, None),
            Verb::Put | Verb::Post if created => (201, body),
            Verb::Put | Verb::Post => match body {
                Some(body) => (200, Some(body)),
                None => (204, None),
            },
        };
        Self {
            status,
            body,
            error: None,
        }
    }

    /// Translate a failure. Internal errors never leak their source.
    pub fn from_error(err: &RestError) -> Self {
        Self {
            status: err.status(),
            body: None,
            error: Some(ErrorBody {
                code: err.code().to_owned(),
                message: err.to_string(),
            }),
        }
    }

    /// Translate either outcome.
    pub fn from_result(verb: Verb, result: Result<Reply, RestError>) -> Self {
        match result {
            Ok(reply) => Self::from_reply(verb, reply),
            Err(err) => Self::from_error(&err),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
