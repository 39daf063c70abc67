//! Error handling for the SIP wire core
//!
//! The framing layers report every failure through a single [`Error`] enum so
//! callers can match on the exact condition: grammar contradictions carry the
//! byte offset where parsing failed, bounded scans report how much budget was
//! burned, and size-limit violations name the limit that was hit.

use std::fmt;
use thiserror::Error;

use crate::types::HeaderName;

/// Result type alias for framing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by the buffer layer and both framers
#[derive(Error, Debug)]
pub enum Error {
    /// Bytes are present but contradict the SIP grammar
    #[error("malformed grammar at offset {offset}: expected {expected}")]
    MalformedGrammar {
        /// Byte offset (from the start of the input) of the offending byte
        offset: usize,
        /// What the grammar required at that position
        expected: &'static str,
    },

    /// A bounded scan ran out of budget before finding its terminator.
    ///
    /// Distinct from "not present": the scan refuses to look further, which
    /// is what keeps adversarial unterminated input from pinning the parser.
    #[error("terminator not found after scanning {scanned} bytes (limit {limit})")]
    TerminatorNotFound { scanned: usize, limit: usize },

    /// A configured message-size limit was exceeded
    #[error("{limit} limit exceeded")]
    SizeLimitExceeded { limit: SizeLimit },

    /// Call-ID was absent from an otherwise complete message
    #[error("mandatory header {header} missing")]
    MandatoryHeaderMissing { header: HeaderName },

    /// An absolute index fell outside the readable window of a buffer
    #[error("index {index} out of range ({readable} readable bytes)")]
    IndexOutOfRange { index: usize, readable: usize },

    /// A stream read would require retaining more bytes than the ring holds
    #[error("request for {requested} bytes exceeds ring capacity {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    /// `build()` was called before the streaming framer reached its terminal
    /// state
    #[error("no framed message available (framer in state {state})")]
    MessageNotReady { state: &'static str },

    /// The blocking stream source failed
    #[error("stream source error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new grammar error at the given absolute byte offset
    pub fn malformed(offset: usize, expected: &'static str) -> Self {
        Self::MalformedGrammar { offset, expected }
    }

    /// Rebase a grammar offset produced against a sub-slice onto the
    /// absolute coordinates of the enclosing buffer.
    pub(crate) fn offset_by(self, base: usize) -> Self {
        match self {
            Self::MalformedGrammar { offset, expected } => Self::MalformedGrammar {
                offset: offset + base,
                expected,
            },
            other => other,
        }
    }

    /// True when more input could turn this failure into a success.
    ///
    /// Only a budget-bounded scan that stopped at the end of the available
    /// bytes (rather than at its limit) qualifies.
    pub fn is_starved(&self) -> bool {
        matches!(self, Self::TerminatorNotFound { scanned, limit } if scanned < limit)
    }
}

/// The configured limit that a [`Error::SizeLimitExceeded`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLimit {
    /// `max_initial_line_size`
    InitialLine,
    /// `max_headers_size`
    Headers,
    /// `max_content_length`
    ContentLength,
}

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialLine => write!(f, "initial-line size"),
            Self::Headers => write!(f, "header-section size"),
            Self::ContentLength => write!(f, "content-length"),
        }
    }
}
