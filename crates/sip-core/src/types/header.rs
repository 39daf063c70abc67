//! Header slices and their typed upgrades
//!
//! A framed message stores each header as a [`HeaderSlice`]: the name as it
//! appeared on the wire, the canonicalized [`HeaderName`], and the logical
//! value bytes (a zero-copy slice of the message buffer, or an owned
//! unfolded copy when the source line was folded).
//!
//! A slice is upgradeable, at most once, to a [`TypedHeader`] through a
//! registry keyed by header name. System headers (To, From, CSeq, Call-ID,
//! Max-Forwards, Via, Route, Record-Route, Contact) are upgraded eagerly by
//! the framers; everything else stays raw.

use std::sync::OnceLock;

use bytes::Bytes;

use crate::error::Result;
use crate::parser::{address, values, via};
use crate::types::{CSeq, CallId, HeaderName, MaxForwards, NameAddr, Via};

/// A header value in strongly-typed form.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedHeader {
    Via(Via),
    To(NameAddr),
    From(NameAddr),
    Contact(NameAddr),
    Route(NameAddr),
    RecordRoute(NameAddr),
    CallId(CallId),
    CSeq(CSeq),
    MaxForwards(MaxForwards),
}

impl TypedHeader {
    pub fn name(&self) -> HeaderName {
        match self {
            TypedHeader::Via(_) => HeaderName::Via,
            TypedHeader::To(_) => HeaderName::To,
            TypedHeader::From(_) => HeaderName::From,
            TypedHeader::Contact(_) => HeaderName::Contact,
            TypedHeader::Route(_) => HeaderName::Route,
            TypedHeader::RecordRoute(_) => HeaderName::RecordRoute,
            TypedHeader::CallId(_) => HeaderName::CallId,
            TypedHeader::CSeq(_) => HeaderName::CSeq,
            TypedHeader::MaxForwards(_) => HeaderName::MaxForwards,
        }
    }
}

/// The header kinds that get an eagerly-resolved slot on every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemKind {
    To,
    From,
    CSeq,
    CallId,
    MaxForwards,
    Via,
    Route,
    RecordRoute,
    Contact,
}

impl SystemKind {
    pub(crate) const COUNT: usize = 9;

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// System kind of a header name, if it is one.
    pub fn of(name: &HeaderName) -> Option<SystemKind> {
        Some(match name {
            HeaderName::To => SystemKind::To,
            HeaderName::From => SystemKind::From,
            HeaderName::CSeq => SystemKind::CSeq,
            HeaderName::CallId => SystemKind::CallId,
            HeaderName::MaxForwards => SystemKind::MaxForwards,
            HeaderName::Via => SystemKind::Via,
            HeaderName::Route => SystemKind::Route,
            HeaderName::RecordRoute => SystemKind::RecordRoute,
            HeaderName::Contact => SystemKind::Contact,
            _ => return None,
        })
    }
}

/// Framer function upgrading raw value bytes to a typed header.
pub(crate) type FramerFn = fn(&[u8], usize) -> Result<TypedHeader>;

/// Registry of typed-header framers, keyed by canonical header name.
///
/// Compact and long spellings resolve to the same [`HeaderName`] before
/// lookup, so the table only needs the canonical identities.
pub(crate) fn system_framer(name: &HeaderName) -> Option<FramerFn> {
    Some(match name {
        HeaderName::Via => |v, b| via::parse_via(v, b).map(TypedHeader::Via),
        HeaderName::To => |v, b| address::parse_name_addr(v, b).map(TypedHeader::To),
        HeaderName::From => |v, b| address::parse_name_addr(v, b).map(TypedHeader::From),
        HeaderName::Contact => |v, b| address::parse_name_addr(v, b).map(TypedHeader::Contact),
        HeaderName::Route => |v, b| address::parse_name_addr(v, b).map(TypedHeader::Route),
        HeaderName::RecordRoute => {
            |v, b| address::parse_name_addr(v, b).map(TypedHeader::RecordRoute)
        }
        HeaderName::CallId => |v, b| values::parse_call_id(v, b).map(TypedHeader::CallId),
        HeaderName::CSeq => |v, b| values::parse_cseq(v, b).map(TypedHeader::CSeq),
        HeaderName::MaxForwards => {
            |v, b| values::parse_max_forwards(v, b).map(TypedHeader::MaxForwards)
        }
        _ => return None,
    })
}

/// One header occurrence: name span plus one logical value.
#[derive(Debug, Clone)]
pub struct HeaderSlice {
    name: HeaderName,
    raw_name: Bytes,
    value: Bytes,
    typed: OnceLock<Option<TypedHeader>>,
}

impl HeaderSlice {
    pub(crate) fn new(name: HeaderName, raw_name: Bytes, value: Bytes) -> Self {
        Self {
            name,
            raw_name,
            value,
            typed: OnceLock::new(),
        }
    }

    /// Canonicalized header name.
    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    /// The name exactly as spelled on the wire (compact forms preserved).
    pub fn raw_name(&self) -> &[u8] {
        &self.raw_name
    }

    /// The logical value bytes, folds already joined.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The value as text.
    pub fn value_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    /// The typed form, upgrading on first access. `None` when the header has
    /// no registered framer or its value does not parse.
    pub fn typed(&self) -> Option<&TypedHeader> {
        self.typed
            .get_or_init(|| {
                system_framer(&self.name).and_then(|frame| frame(&self.value, 0).ok())
            })
            .as_ref()
    }

    /// Store an eagerly-framed typed value. No effect if already upgraded.
    pub(crate) fn memoize(&self, typed: TypedHeader) {
        let _ = self.typed.set(Some(typed));
    }
}
