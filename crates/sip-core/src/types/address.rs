//! Addresses as carried by To, From, Contact, Route and Record-Route
//!
//! All five headers share one shape: an optional display name, a URI, and
//! trailing `;name=value` parameters. The URI itself is kept as opaque text;
//! structural URI parsing belongs to the caller.

use std::fmt;

use crate::types::param::{find_param, Param};

/// A `name-addr` / `addr-spec` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAddr {
    pub display_name: Option<String>,
    pub uri: String,
    pub params: Vec<Param>,
}

impl NameAddr {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            display_name: None,
            uri: uri.into(),
            params: Vec::new(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Parameter value by name, case-insensitively. `Some(None)` means the
    /// parameter is present as a flag.
    pub fn param(&self, name: &str) -> Option<Option<&str>> {
        find_param(&self.params, name).map(|p| p.value.as_deref())
    }

    /// The `tag` parameter, which To and From use for dialog identification.
    pub fn tag(&self) -> Option<&str> {
        self.param("tag").flatten()
    }
}

impl fmt::Display for NameAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) if name.chars().all(is_display_token_char) && !name.is_empty() => {
                write!(f, "{} <{}>", name, self.uri)?
            }
            Some(name) => write!(f, "\"{}\" <{}>", name.replace('"', "\\\""), self.uri)?,
            None => write!(f, "<{}>", self.uri)?,
        }
        for p in &self.params {
            write!(f, ";{}", p)?;
        }
        Ok(())
    }
}

fn is_display_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '-' | '.' | '!' | '%' | '*' | '_' | '+' | '`' | '\'' | '~' | ' ')
}
