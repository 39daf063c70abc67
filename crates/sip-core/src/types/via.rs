//! Via header
//!
//! Each Via entry records one hop: the transport it was sent over, the
//! `sent-by` host and optional port, and parameters — most importantly
//! `branch`, the transaction identifier. A comma-separated Via line frames
//! into one entry per logical value, so this type represents a single entry.

use std::fmt;

use crate::types::param::{find_param, Param};
use crate::types::Host;

/// One Via entry: `SIP/2.0/<transport> host[:port] *(;param)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Via {
    /// Transport token from the sent-protocol (`UDP`, `TCP`, `TLS`, ...)
    pub transport: String,
    pub host: Host,
    pub port: Option<u16>,
    pub params: Vec<Param>,
}

impl Via {
    pub fn new(transport: impl Into<String>, host: Host, port: Option<u16>) -> Self {
        Self {
            transport: transport.into(),
            host,
            port,
            params: Vec::new(),
        }
    }

    /// The `branch` parameter identifying the transaction.
    pub fn branch(&self) -> Option<&str> {
        find_param(&self.params, "branch").and_then(|p| p.value.as_deref())
    }

    /// Parameter value by name, case-insensitively.
    pub fn param(&self, name: &str) -> Option<Option<&str>> {
        find_param(&self.params, name).map(|p| p.value.as_deref())
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIP/2.0/{} {}", self.transport, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        for p in &self.params {
            write!(f, ";{}", p)?;
        }
        Ok(())
    }
}
