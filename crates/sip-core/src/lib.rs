//! # sipwire-sip-core
//!
//! SIP (RFC 3261) wire-protocol framing: decode raw bytes into a
//! structured, queryable [`SipMessage`], either from a single fully
//! buffered datagram or incrementally from an arbitrarily chunked TCP
//! stream.
//!
//! The crate is built from two layers:
//!
//! - a zero-copy byte-buffer layer ([`buffer`]): a borrowed cursor with
//!   slicing, mark/reset and budget-bounded scans, plus a ring-buffer
//!   adapter over a blocking byte source;
//! - a resumable grammar layer ([`parser`]): nom-based lexical rules, a
//!   stateful header-value scanner, a batch framer, and a streaming framer
//!   that produces identical results whether the bytes arrive as one chunk
//!   or a thousand one-byte chunks.
//!
//! Framing exposes structure; it does not enforce dialog-level legality.
//! Dialog correlation, transport reassembly and SDP parsing are the
//! caller's business.
//!
//! ## Batch
//!
//! ```rust
//! use bytes::Bytes;
//! use sipwire_sip_core::prelude::*;
//!
//! let raw = Bytes::from_static(
//!     b"INVITE sip:bob@biloxi.com SIP/2.0\r\n\
//!       Via: SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bK776\r\n\
//!       To: <sip:bob@biloxi.com>\r\n\
//!       From: <sip:alice@atlanta.com>;tag=1928301774\r\n\
//!       Call-ID: a84b4c76e66710@pc33.atlanta.com\r\n\
//!       CSeq: 314159 INVITE\r\n\
//!       Content-Length: 0\r\n\r\n",
//! );
//! let msg = frame(&raw).unwrap();
//! assert_eq!(msg.via().unwrap().branch(), Some("z9hG4bK776"));
//! assert_eq!(msg.cseq().unwrap().seq, 314159);
//! ```
//!
//! ## Streaming
//!
//! ```rust
//! use sipwire_sip_core::prelude::*;
//!
//! let raw = b"OPTIONS sip:example.com SIP/2.0\r\n\
//!             Call-ID: 1@example.com\r\n\
//!             Content-Length: 0\r\n\r\n";
//! let mut framer = StreamingFramer::new();
//! let mut ready = false;
//! for byte in raw.iter() {
//!     ready = framer.process(std::slice::from_ref(byte)).unwrap();
//! }
//! assert!(ready);
//! let msg = framer.build().unwrap();
//! assert_eq!(msg.call_id().unwrap().as_str(), "1@example.com");
//! ```

pub mod buffer;
pub mod builder;
pub mod config;
pub mod error;
pub mod parser;
pub mod types;

pub use buffer::{ByteCursor, RingBuffer, StreamCursor};
pub use builder::MessageBuilder;
pub use config::FramerConfig;
pub use error::{Error, Result, SizeLimit};
pub use parser::{frame, frame_with_config, StreamingFramer};
pub use types::SipMessage;

/// Everything a typical consumer needs.
pub mod prelude {
    pub use crate::buffer::{ByteCursor, RingBuffer, StreamCursor};
    pub use crate::builder::MessageBuilder;
    pub use crate::config::FramerConfig;
    pub use crate::error::{Error, Result, SizeLimit};
    pub use crate::parser::{frame, frame_with_config, StreamingFramer};
    pub use crate::types::{
        CSeq, CallId, HeaderName, HeaderSlice, Host, MaxForwards, Method, NameAddr, Param,
        RequestLine, SipMessage, StartLine, StatusLine, SystemKind, TypedHeader, Via,
    };
}
