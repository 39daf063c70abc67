//! Derived-message builder
//!
//! A [`SipMessage`] is never edited in place. [`MessageBuilder`] assembles a
//! new message — usually seeded by [`SipMessage::copy`] — serializes it with
//! canonical CRLF line endings and a recomputed Content-Length, and frames
//! its own output, so a built message is indistinguishable from one framed
//! off the wire.
//!
//! Seeded header values are owned copies; a builder never aliases the
//! buffer of the message it was derived from and may outlive it freely.

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::FramerConfig;
use crate::error::Result;
use crate::parser::batch;
use crate::types::{HeaderName, Method, RequestLine, SipMessage, StartLine, StatusLine};

/// Builder for a new or derived message.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    start_line: StartLine,
    headers: Vec<(HeaderName, Bytes)>,
    body: Option<Bytes>,
}

impl MessageBuilder {
    /// Start a request.
    pub fn request(method: Method, uri: impl Into<String>) -> Self {
        Self::from_start_line(StartLine::Request(RequestLine::new(method, uri)))
    }

    /// Start a response.
    pub fn response(code: u16, reason: impl Into<String>) -> Self {
        Self::from_start_line(StartLine::Status(StatusLine::new(code, reason)))
    }

    pub(crate) fn from_start_line(start_line: StartLine) -> Self {
        Self {
            start_line,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Replace the start line with a request line.
    pub fn request_line(mut self, method: Method, uri: impl Into<String>) -> Self {
        self.start_line = StartLine::Request(RequestLine::new(method, uri));
        self
    }

    /// Replace the start line with a status line (deriving a response).
    pub fn status_line(mut self, code: u16, reason: impl Into<String>) -> Self {
        self.start_line = StartLine::Status(StatusLine::new(code, reason));
        self
    }

    /// Append a header with a textual value.
    pub fn header(self, name: HeaderName, value: impl AsRef<str>) -> Self {
        self.header_bytes(name, Bytes::copy_from_slice(value.as_ref().as_bytes()))
    }

    pub(crate) fn header_bytes(mut self, name: HeaderName, value: Bytes) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Set the body. Content-Length is derived from it at build time.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize and frame the message.
    ///
    /// Headers are emitted in insertion order under their canonical names;
    /// any Content-Length among them is dropped and re-emitted from the
    /// actual body length.
    pub fn build(self) -> Result<SipMessage> {
        let body = self.body.unwrap_or_default();
        let mut wire = BytesMut::with_capacity(256 + body.len());

        wire.put_slice(self.start_line.to_string().as_bytes());
        wire.put_slice(b"\r\n");
        for (name, value) in &self.headers {
            if *name == HeaderName::ContentLength {
                continue;
            }
            wire.put_slice(name.as_str().as_bytes());
            wire.put_slice(b": ");
            wire.put_slice(value);
            wire.put_slice(b"\r\n");
        }
        wire.put_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
        wire.put_slice(b"\r\n");
        wire.put_slice(&body);

        // Frame our own serialization; the result is exactly what a peer
        // would see. Limits scale up so a legitimate oversized derivation
        // does not trip the defaults.
        let defaults = FramerConfig::default();
        let config = FramerConfig {
            max_initial_line_size: defaults.max_initial_line_size.max(wire.len()),
            max_headers_size: defaults.max_headers_size.max(wire.len()),
            max_content_length: defaults.max_content_length.max(body.len()),
            ..defaults
        };
        batch::frame_with_config(&wire.freeze(), &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_recomputes_content_length() {
        let msg = MessageBuilder::request(Method::Options, "sip:example.com")
            .header(HeaderName::Via, "SIP/2.0/UDP host;branch=z9hG4bK1")
            .header(HeaderName::CallId, "abc@host")
            .header(HeaderName::CSeq, "1 OPTIONS")
            .header(HeaderName::ContentLength, "999")
            .body(&b"hello"[..])
            .build()
            .unwrap();

        let text = String::from_utf8(msg.to_buffer().to_vec()).unwrap();
        assert_eq!(text.matches("Content-Length").count(), 1);
        assert!(text.contains("Content-Length: 5\r\n"));
        assert_eq!(msg.body(), b"hello");
    }

    #[test]
    fn test_built_message_is_queryable() {
        let msg = MessageBuilder::response(486, "Busy Here")
            .header(HeaderName::Via, "SIP/2.0/TCP host;branch=z9hG4bK2")
            .header(HeaderName::To, "<sip:bob@biloxi.com>;tag=a6c85cf")
            .header(HeaderName::From, "<sip:alice@atlanta.com>;tag=1928301774")
            .header(HeaderName::CallId, "a84b4c76e66710")
            .header(HeaderName::CSeq, "314159 INVITE")
            .build()
            .unwrap();

        assert_eq!(msg.status_line().unwrap().code, 486);
        assert_eq!(msg.call_id().unwrap().as_str(), "a84b4c76e66710");
        assert_eq!(msg.to_header().unwrap().tag(), Some("a6c85cf"));
    }
}
