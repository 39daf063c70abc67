//! Host portion of a `sent-by` or parameter value

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A host as it appears in a Via `sent-by`: a domain name, a dotted-decimal
/// IPv4 address, or a bracketed IPv6 literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    /// DNS hostname, stored with its original spelling
    Domain(String),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
}

impl Host {
    /// The textual form without IPv6 brackets.
    pub fn as_text(&self) -> String {
        match self {
            Host::Domain(d) => d.clone(),
            Host::Ipv4(a) => a.to_string(),
            Host::Ipv6(a) => a.to_string(),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Domain(d) => write!(f, "{}", d),
            Host::Ipv4(a) => write!(f, "{}", a),
            // IPv6 literals are always bracketed on the wire.
            Host::Ipv6(a) => write!(f, "[{}]", a),
        }
    }
}
