//! SIP header names
//!
//! Header names are case-insensitive in SIP, and several carry a single
//! letter compact form (`v` for Via, `i` for Call-ID, ...). This enum
//! preserves the canonical capitalization for known headers while resolving
//! every spelling — long, compact, any case — to the same identity, so a
//! lookup by `"i"` and a lookup by `"CALL-ID"` find the same header.
//!
//! Parsing takes a case-sensitive fast path over the canonical and compact
//! spellings first and only then falls back to a case-insensitive pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Known SIP header names plus a catch-all for extension headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderName {
    /// Call-ID: unique identifier for this call (compact form `i`)
    CallId,
    /// Contact: where subsequent requests should be sent (compact form `m`)
    Contact,
    /// Content-Length: size of the message body (compact form `l`)
    ContentLength,
    /// Content-Type: media type of the message body (compact form `c`)
    ContentType,
    /// CSeq: command sequence number
    CSeq,
    /// From: initiator of the request (compact form `f`)
    From,
    /// Max-Forwards: limit on the number of hops
    MaxForwards,
    /// To: logical recipient of the request (compact form `t`)
    To,
    /// Via: path taken by the request so far (compact form `v`)
    Via,
    /// Route: forced route for a request
    Route,
    /// Record-Route: proxies that want to stay in the path
    RecordRoute,
    /// Allow: methods supported by the UA
    Allow,
    /// Allow-Events: event packages supported by the UA (compact form `u`)
    AllowEvents,
    /// Date: origination time of the message
    Date,
    /// Subject: subject of the call (compact form `s`)
    Subject,
    /// Supported: extensions supported by the UA (compact form `k`)
    Supported,
    /// Extension header, stored with its original spelling
    Other(String),
}

impl HeaderName {
    /// Canonical spelling of the header name.
    pub fn as_str(&self) -> &str {
        match self {
            HeaderName::CallId => "Call-ID",
            HeaderName::Contact => "Contact",
            HeaderName::ContentLength => "Content-Length",
            HeaderName::ContentType => "Content-Type",
            HeaderName::CSeq => "CSeq",
            HeaderName::From => "From",
            HeaderName::MaxForwards => "Max-Forwards",
            HeaderName::To => "To",
            HeaderName::Via => "Via",
            HeaderName::Route => "Route",
            HeaderName::RecordRoute => "Record-Route",
            HeaderName::Allow => "Allow",
            HeaderName::AllowEvents => "Allow-Events",
            HeaderName::Date => "Date",
            HeaderName::Subject => "Subject",
            HeaderName::Supported => "Supported",
            HeaderName::Other(s) => s,
        }
    }

    /// Exact-spelling lookup over canonical long and compact forms.
    fn from_exact(s: &str) -> Option<Self> {
        Some(match s {
            "Call-ID" | "i" => HeaderName::CallId,
            "Contact" | "m" => HeaderName::Contact,
            "Content-Length" | "l" => HeaderName::ContentLength,
            "Content-Type" | "c" => HeaderName::ContentType,
            "CSeq" => HeaderName::CSeq,
            "From" | "f" => HeaderName::From,
            "Max-Forwards" => HeaderName::MaxForwards,
            "To" | "t" => HeaderName::To,
            "Via" | "v" => HeaderName::Via,
            "Route" => HeaderName::Route,
            "Record-Route" => HeaderName::RecordRoute,
            "Allow" => HeaderName::Allow,
            "Allow-Events" | "u" => HeaderName::AllowEvents,
            "Date" => HeaderName::Date,
            "Subject" | "s" => HeaderName::Subject,
            "Supported" | "k" => HeaderName::Supported,
            _ => return None,
        })
    }

    /// Parse a header name as it appeared on the wire.
    pub fn from_bytes(name: &[u8]) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::malformed(0, "header name"));
        }
        let s = std::str::from_utf8(name).map_err(|_| Error::malformed(0, "header name"))?;

        // Fast path: canonical spellings are by far the most common.
        if let Some(known) = Self::from_exact(s) {
            return Ok(known);
        }
        // Case-insensitive second pass.
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "call-id" => Ok(HeaderName::CallId),
            "contact" => Ok(HeaderName::Contact),
            "content-length" => Ok(HeaderName::ContentLength),
            "content-type" => Ok(HeaderName::ContentType),
            "cseq" => Ok(HeaderName::CSeq),
            "from" => Ok(HeaderName::From),
            "max-forwards" => Ok(HeaderName::MaxForwards),
            "to" => Ok(HeaderName::To),
            "via" => Ok(HeaderName::Via),
            "route" => Ok(HeaderName::Route),
            "record-route" => Ok(HeaderName::RecordRoute),
            "allow" => Ok(HeaderName::Allow),
            "allow-events" => Ok(HeaderName::AllowEvents),
            "date" => Ok(HeaderName::Date),
            "subject" => Ok(HeaderName::Subject),
            "supported" => Ok(HeaderName::Supported),
            "i" => Ok(HeaderName::CallId),
            "m" => Ok(HeaderName::Contact),
            "l" => Ok(HeaderName::ContentLength),
            "c" => Ok(HeaderName::ContentType),
            "f" => Ok(HeaderName::From),
            "t" => Ok(HeaderName::To),
            "v" => Ok(HeaderName::Via),
            "u" => Ok(HeaderName::AllowEvents),
            "s" => Ok(HeaderName::Subject),
            "k" => Ok(HeaderName::Supported),
            _ => Ok(HeaderName::Other(s.to_string())),
        }
    }

    /// Identity comparison for lookups. Known headers compare by variant
    /// (compact forms already resolved); extension headers compare their
    /// spellings case-insensitively.
    pub fn matches(&self, other: &HeaderName) -> bool {
        match (self, other) {
            (HeaderName::Other(a), HeaderName::Other(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }

    /// Whether a literal comma inside this header's value separates logical
    /// values.
    ///
    /// Most headers are comma-separated lists, but a small class carries
    /// free-text or date values where the comma is data: Date, Allow,
    /// Subject and Allow-Events (the compact forms resolve to the same
    /// variants, so they are covered automatically).
    pub fn comma_separates_values(&self) -> bool {
        !matches!(
            self,
            HeaderName::Date | HeaderName::Allow | HeaderName::Subject | HeaderName::AllowEvents
        )
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HeaderName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HeaderName::from_bytes(s.as_bytes())
    }
}
