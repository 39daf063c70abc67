//! The framed message
//!
//! [`SipMessage`] is the immutable result of framing: the exact wire bytes,
//! the initial line, every header in original order (duplicates preserved),
//! an index of the first occurrence of each system header, and the body.
//! It is created once per framed message and never mutated — deriving a
//! related message goes through [`copy`](SipMessage::copy) and the builder.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::types::header::{SystemKind, TypedHeader};
use crate::types::{
    CSeq, CallId, HeaderName, HeaderSlice, MaxForwards, NameAddr, RequestLine, StartLine,
    StatusLine, Via,
};
use crate::builder::MessageBuilder;
use crate::parser::values;

/// An immutable, queryable SIP message.
#[derive(Debug, Clone)]
pub struct SipMessage {
    buffer: Bytes,
    start_line: StartLine,
    headers: Vec<HeaderSlice>,
    /// Index (into `headers`) of the first occurrence per system kind.
    system: [Option<usize>; SystemKind::COUNT],
    body: Option<Bytes>,
}

impl SipMessage {
    pub(crate) fn new(
        buffer: Bytes,
        start_line: StartLine,
        headers: Vec<HeaderSlice>,
        body: Option<Bytes>,
    ) -> Self {
        let mut system = [None; SystemKind::COUNT];
        for (i, header) in headers.iter().enumerate() {
            if let Some(kind) = SystemKind::of(header.name()) {
                system[kind.index()].get_or_insert(i);
            }
        }
        Self {
            buffer,
            start_line,
            headers,
            system,
            body,
        }
    }

    pub fn start_line(&self) -> &StartLine {
        &self.start_line
    }

    pub fn is_request(&self) -> bool {
        self.start_line.is_request()
    }

    pub fn is_response(&self) -> bool {
        !self.is_request()
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        self.start_line.as_request()
    }

    pub fn status_line(&self) -> Option<&StatusLine> {
        self.start_line.as_status()
    }

    /// All headers in wire order, duplicates included.
    pub fn headers(&self) -> &[HeaderSlice] {
        &self.headers
    }

    /// First header matching `name`. Matching is case-insensitive and
    /// resolves compact forms, so `get_header("i")` and
    /// `get_header("Call-ID")` find the same header.
    pub fn get_header(&self, name: &str) -> Option<&HeaderSlice> {
        let wanted = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.headers.iter().find(|h| h.name().matches(&wanted))
    }

    /// Every header matching `name`, in wire order.
    pub fn get_headers(&self, name: &str) -> Vec<&HeaderSlice> {
        match HeaderName::from_bytes(name.as_bytes()) {
            Ok(wanted) => self
                .headers
                .iter()
                .filter(|h| h.name().matches(&wanted))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn system_typed(&self, kind: SystemKind) -> Option<&TypedHeader> {
        let index = self.system[kind.index()]?;
        self.headers[index].typed()
    }

    /// First Via entry.
    pub fn via(&self) -> Option<&Via> {
        match self.system_typed(SystemKind::Via)? {
            TypedHeader::Via(via) => Some(via),
            _ => None,
        }
    }

    /// Every Via entry, in wire order.
    pub fn vias(&self) -> Vec<&Via> {
        self.headers
            .iter()
            .filter(|h| *h.name() == HeaderName::Via)
            .filter_map(|h| match h.typed() {
                Some(TypedHeader::Via(via)) => Some(via),
                _ => None,
            })
            .collect()
    }

    pub fn to_header(&self) -> Option<&NameAddr> {
        match self.system_typed(SystemKind::To)? {
            TypedHeader::To(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn from_header(&self) -> Option<&NameAddr> {
        match self.system_typed(SystemKind::From)? {
            TypedHeader::From(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn contact(&self) -> Option<&NameAddr> {
        match self.system_typed(SystemKind::Contact)? {
            TypedHeader::Contact(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn route(&self) -> Option<&NameAddr> {
        match self.system_typed(SystemKind::Route)? {
            TypedHeader::Route(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn record_route(&self) -> Option<&NameAddr> {
        match self.system_typed(SystemKind::RecordRoute)? {
            TypedHeader::RecordRoute(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn cseq(&self) -> Option<&CSeq> {
        match self.system_typed(SystemKind::CSeq)? {
            TypedHeader::CSeq(cseq) => Some(cseq),
            _ => None,
        }
    }

    pub fn max_forwards(&self) -> Option<&MaxForwards> {
        match self.system_typed(SystemKind::MaxForwards)? {
            TypedHeader::MaxForwards(mf) => Some(mf),
            _ => None,
        }
    }

    /// Call-ID is mandatory: a message without one is an error, not a
    /// silently absent value.
    pub fn call_id(&self) -> Result<&CallId> {
        match self.system_typed(SystemKind::CallId) {
            Some(TypedHeader::CallId(call_id)) => Ok(call_id),
            _ => Err(Error::MandatoryHeaderMissing {
                header: HeaderName::CallId,
            }),
        }
    }

    /// Declared Content-Length, when present and parseable.
    pub fn content_length(&self) -> Option<usize> {
        let header = self
            .headers
            .iter()
            .find(|h| *h.name() == HeaderName::ContentLength)?;
        values::parse_content_length(header.value(), 0).ok()
    }

    /// The message body (empty slice when absent).
    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or(&[])
    }

    /// The exact wire bytes this message was framed from. Zero-copy for a
    /// framed message; a builder-derived message carries its own
    /// serialization.
    pub fn to_buffer(&self) -> Bytes {
        self.buffer.clone()
    }

    /// Builder for a derived message, pre-seeded with only To, From, Via,
    /// Call-ID and CSeq (the headers a response or in-dialog request
    /// inherits). Everything else must be re-added explicitly.
    pub fn copy(&self) -> MessageBuilder {
        let mut builder = MessageBuilder::from_start_line(self.start_line.clone());
        for header in &self.headers {
            if matches!(
                header.name(),
                HeaderName::To
                    | HeaderName::From
                    | HeaderName::Via
                    | HeaderName::CallId
                    | HeaderName::CSeq
            ) {
                builder = builder.header_bytes(
                    header.name().clone(),
                    Bytes::copy_from_slice(header.value()),
                );
            }
        }
        builder
    }
}
