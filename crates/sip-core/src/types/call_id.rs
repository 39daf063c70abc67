//! Call-ID header

use std::fmt;

/// Call-ID header value: a globally unique identifier for the call.
///
/// This is the one header whose absence from an otherwise complete message
/// is an error; see
/// [`SipMessage::call_id`](crate::types::SipMessage::call_id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallId(pub String);

impl CallId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
