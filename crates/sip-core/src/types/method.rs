//! SIP request methods

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// SIP request method.
///
/// Covers the RFC 3261 methods plus the common extension methods; anything
/// else is preserved verbatim in `Extension`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Invite,
    Ack,
    Bye,
    Cancel,
    Register,
    Options,
    Prack,
    Update,
    Info,
    Subscribe,
    Notify,
    Refer,
    Message,
    Publish,
    /// Non-standard method, stored with its original spelling
    Extension(String),
}

impl Method {
    /// Canonical (upper-case) spelling of the method.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Invite => "INVITE",
            Method::Ack => "ACK",
            Method::Bye => "BYE",
            Method::Cancel => "CANCEL",
            Method::Register => "REGISTER",
            Method::Options => "OPTIONS",
            Method::Prack => "PRACK",
            Method::Update => "UPDATE",
            Method::Info => "INFO",
            Method::Subscribe => "SUBSCRIBE",
            Method::Notify => "NOTIFY",
            Method::Refer => "REFER",
            Method::Message => "MESSAGE",
            Method::Publish => "PUBLISH",
            Method::Extension(s) => s,
        }
    }

    /// Parse a method token. Method names are case-sensitive per RFC 3261;
    /// an unrecognized token becomes `Extension`.
    pub fn from_token(token: &[u8]) -> Result<Self> {
        let s = std::str::from_utf8(token)
            .map_err(|_| Error::malformed(0, "method token"))?;
        Ok(match s {
            "INVITE" => Method::Invite,
            "ACK" => Method::Ack,
            "BYE" => Method::Bye,
            "CANCEL" => Method::Cancel,
            "REGISTER" => Method::Register,
            "OPTIONS" => Method::Options,
            "PRACK" => Method::Prack,
            "UPDATE" => Method::Update,
            "INFO" => Method::Info,
            "SUBSCRIBE" => Method::Subscribe,
            "NOTIFY" => Method::Notify,
            "REFER" => Method::Refer,
            "MESSAGE" => Method::Message,
            "PUBLISH" => Method::Publish,
            other => Method::Extension(other.to_string()),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::from_token(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_round_trip() {
        for name in [
            "INVITE", "ACK", "BYE", "CANCEL", "REGISTER", "OPTIONS", "PRACK", "UPDATE", "INFO",
            "SUBSCRIBE", "NOTIFY", "REFER", "MESSAGE", "PUBLISH",
        ] {
            let method = Method::from_token(name.as_bytes()).unwrap();
            assert!(!matches!(method, Method::Extension(_)), "{name}");
            assert_eq!(method.as_str(), name);
        }
    }

    #[test]
    fn test_methods_are_case_sensitive() {
        // "invite" is a legal extension method name, not INVITE.
        let method = Method::from_token(b"invite").unwrap();
        assert_eq!(method, Method::Extension("invite".to_string()));
    }
}
