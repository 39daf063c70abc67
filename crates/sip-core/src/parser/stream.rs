//! Streaming framer: incremental message framing over a byte stream
//!
//! [`StreamingFramer`] frames messages from arbitrarily fragmented input —
//! one byte at a time or a megabyte at a time — and produces exactly the
//! message the batch framer would produce from the same bytes.
//!
//! `process(chunk)` appends the chunk to an internal buffer and runs the
//! state machine to a fixed point: it stops when one iteration neither
//! changed the state nor advanced the read position. Each state handler
//! either consumes input and moves on, or detects that its delimiter has
//! not arrived and returns to its own state to wait. That
//! return-to-self-on-insufficiency is what makes framing independent of how
//! the bytes were chunked.
//!
//! `process` never blocks and never treats incomplete input as an error; it
//! fails only on bytes that contradict the grammar outright (a wrong SIP
//! version, a malformed system header) or on a configured size limit, at
//! which point the connection should be closed by the caller.

use bytes::BytesMut;
use tracing::{debug, trace};

use crate::config::FramerConfig;
use crate::error::{Error, Result, SizeLimit};
use crate::parser::batch::parse_start_line;
use crate::parser::scanner::{ScanOutcome, ScanState, ValueSpan};
use crate::parser::token::is_token_char;
use crate::parser::values;
use crate::types::{
    header::system_framer, HeaderName, HeaderSlice, SipMessage, StartLine, TypedHeader,
};

/// The framer's explicit state. One message runs `Init` through `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramerState {
    Init,
    GetInitialLine,
    GetHeaderName,
    ConsumeHcolon,
    ConsumeSwsAfterHcolon,
    GetHeaderValues,
    CheckForEndOfHeaderSection,
    GetPayload,
    Done,
}

impl FramerState {
    fn name(self) -> &'static str {
        match self {
            FramerState::Init => "INIT",
            FramerState::GetInitialLine => "GET_INITIAL_LINE",
            FramerState::GetHeaderName => "GET_HEADER_NAME",
            FramerState::ConsumeHcolon => "CONSUME_HCOLON",
            FramerState::ConsumeSwsAfterHcolon => "CONSUME_SWS_AFTER_HCOLON",
            FramerState::GetHeaderValues => "GET_HEADER_VALUES",
            FramerState::CheckForEndOfHeaderSection => "CHECK_FOR_END_OF_HEADER_SECTION",
            FramerState::GetPayload => "GET_PAYLOAD",
            FramerState::Done => "DONE",
        }
    }
}

/// Header name currently being consumed.
#[derive(Debug, Clone)]
struct CurrentName {
    start: usize,
    stop: usize,
    name: HeaderName,
}

/// A fully scanned header awaiting `build()`.
#[derive(Debug, Clone)]
struct PendingHeader {
    name: HeaderName,
    name_span: (usize, usize),
    span: ValueSpan,
    typed: Option<TypedHeader>,
}

/// Incremental framer for one connection.
///
/// One instance per connection; it is plain single-threaded mutable state.
/// Abandoning a partially framed message is just dropping the framer.
#[derive(Debug)]
pub struct StreamingFramer {
    config: FramerConfig,
    state: FramerState,
    buf: BytesMut,
    /// Read position within `buf`; bytes before it are consumed.
    pos: usize,
    /// Offset of the current message's initial line within `buf`.
    msg_start: usize,
    /// Offset just past the initial line's terminator.
    headers_start: usize,
    start_line: Option<StartLine>,
    current_name: Option<CurrentName>,
    scan: Option<ScanState>,
    headers: Vec<PendingHeader>,
    content_length: Option<usize>,
    body_span: Option<(usize, usize)>,
}

impl StreamingFramer {
    pub fn new() -> Self {
        Self::with_config(FramerConfig::default())
    }

    pub fn with_config(config: FramerConfig) -> Self {
        Self {
            config,
            state: FramerState::Init,
            buf: BytesMut::new(),
            pos: 0,
            msg_start: 0,
            headers_start: 0,
            start_line: None,
            current_name: None,
            scan: None,
            headers: Vec::new(),
            content_length: None,
            body_span: None,
        }
    }

    /// Feed a chunk. Returns true when a complete message is framed and
    /// [`build`](Self::build) may be called. Never blocks.
    pub fn process(&mut self, chunk: &[u8]) -> Result<bool> {
        self.buf.extend_from_slice(chunk);
        if self.state == FramerState::Done {
            return Ok(true);
        }
        loop {
            let state_before = self.state;
            let pos_before = self.pos;
            self.step()?;
            if self.state == FramerState::Done {
                break;
            }
            if self.state == state_before && self.pos == pos_before {
                // Fixed point: nothing more can move without new input.
                break;
            }
        }
        Ok(self.state == FramerState::Done)
    }

    /// Bytes buffered beyond the framer's read position — either a message
    /// still being framed or the start of a pipelined successor.
    pub fn has_unconsumed_data(&self) -> bool {
        self.buf.len() > self.pos
    }

    /// Extract the framed message. Valid only after `process` returned true;
    /// any buffered trailing bytes are retained for the next message and the
    /// per-message state resets.
    pub fn build(&mut self) -> Result<SipMessage> {
        if self.state != FramerState::Done {
            return Err(Error::MessageNotReady {
                state: self.state.name(),
            });
        }
        let end = self.pos;
        // Freeze the framed span zero-copy; the leftover (a pipelined
        // successor's first bytes) stays at the front of the working buffer.
        let frozen = self.buf.split_to(end).freeze();

        let start_line = self.start_line.take().ok_or(Error::MessageNotReady {
            state: FramerState::Done.name(),
        })?;
        let headers = self
            .headers
            .drain(..)
            .map(|h| {
                let value = h.span.materialize(&frozen);
                let slice = HeaderSlice::new(
                    h.name,
                    frozen.slice(h.name_span.0..h.name_span.1),
                    value,
                );
                if let Some(typed) = h.typed {
                    slice.memoize(typed);
                }
                slice
            })
            .collect();
        let body = self.body_span.map(|(start, stop)| frozen.slice(start..stop));
        let message = SipMessage::new(frozen.slice(self.msg_start..end), start_line, headers, body);

        self.state = FramerState::Init;
        self.pos = 0;
        self.msg_start = 0;
        self.headers_start = 0;
        self.current_name = None;
        self.scan = None;
        self.content_length = None;
        self.body_span = None;

        debug!(
            start_line = %message.start_line(),
            leftover = self.buf.len(),
            "built streamed message"
        );
        Ok(message)
    }

    fn set_state(&mut self, next: FramerState) {
        trace!(from = self.state.name(), to = next.name(), pos = self.pos, "framer transition");
        self.state = next;
    }

    fn step(&mut self) -> Result<()> {
        match self.state {
            FramerState::Init => self.on_init(),
            FramerState::GetInitialLine => self.on_initial_line(),
            FramerState::GetHeaderName => self.on_header_name(),
            FramerState::ConsumeHcolon => self.on_hcolon(),
            FramerState::ConsumeSwsAfterHcolon => self.on_sws_after_hcolon(),
            FramerState::GetHeaderValues => self.on_header_values(),
            FramerState::CheckForEndOfHeaderSection => self.on_check_end(),
            FramerState::GetPayload => self.on_payload(),
            FramerState::Done => Ok(()),
        }
    }

    /// Tolerant stream prefix: swallow SP/HTAB/CR/LF before the message.
    fn on_init(&mut self) -> Result<()> {
        while matches!(
            self.buf.get(self.pos),
            Some(b'\r' | b'\n' | b' ' | b'\t')
        ) {
            self.pos += 1;
        }
        if self.pos < self.buf.len() {
            self.msg_start = self.pos;
            self.set_state(FramerState::GetInitialLine);
        }
        Ok(())
    }

    /// The initial line is small and bounded, so it is cheap to re-attempt
    /// wholesale: find its LF, parse the whole line, or wait.
    fn on_initial_line(&mut self) -> Result<()> {
        let window_end = (self.msg_start + self.config.max_initial_line_size).min(self.buf.len());
        match self.buf[self.pos..window_end].iter().position(|&b| b == b'\n') {
            Some(rel) => {
                let lf = self.pos + rel;
                let line_end = if lf > self.msg_start && self.buf[lf - 1] == b'\r' {
                    lf - 1
                } else {
                    lf
                };
                let start_line = parse_start_line(&self.buf[self.msg_start..line_end], self.msg_start)?;
                self.start_line = Some(start_line);
                self.pos = lf + 1;
                self.headers_start = self.pos;
                self.set_state(FramerState::GetHeaderName);
            }
            None => {
                if self.buf.len() - self.msg_start >= self.config.max_initial_line_size {
                    return Err(Error::SizeLimitExceeded {
                        limit: SizeLimit::InitialLine,
                    });
                }
                // Return to self: the line has not fully arrived.
            }
        }
        Ok(())
    }

    fn on_header_name(&mut self) -> Result<()> {
        match self.buf.get(self.pos) {
            None => Ok(()), // wait
            Some(b'\r' | b'\n') => {
                // Possibly the blank line; a dedicated state decides.
                self.set_state(FramerState::CheckForEndOfHeaderSection);
                Ok(())
            }
            Some(_) => {
                let budget = self
                    .config
                    .max_headers_size
                    .saturating_sub(self.pos - self.headers_start);
                let window_end = (self.pos + budget).min(self.buf.len());
                match self.buf[self.pos..window_end]
                    .iter()
                    .position(|&b| matches!(b, b' ' | b'\t' | b':'))
                {
                    Some(rel) => {
                        let name_bytes = &self.buf[self.pos..self.pos + rel];
                        if rel == 0 {
                            return Err(Error::malformed(self.pos, "header name"));
                        }
                        if let Some(bad) = name_bytes.iter().position(|&b| !is_token_char(b)) {
                            return Err(Error::malformed(self.pos + bad, "header name"));
                        }
                        let name = HeaderName::from_bytes(name_bytes)
                            .map_err(|e| e.offset_by(self.pos))?;
                        self.current_name = Some(CurrentName {
                            start: self.pos,
                            stop: self.pos + rel,
                            name,
                        });
                        self.pos += rel;
                        self.set_state(FramerState::ConsumeHcolon);
                        Ok(())
                    }
                    None => {
                        if window_end - self.pos >= budget {
                            return Err(Error::SizeLimitExceeded {
                                limit: SizeLimit::Headers,
                            });
                        }
                        Ok(()) // wait
                    }
                }
            }
        }
    }

    /// First resumable half of HCOLON: `*( SP / HTAB ) ":"`. The colon may
    /// arrive in one chunk and the whitespace after it in the next, hence
    /// the split into two states.
    fn on_hcolon(&mut self) -> Result<()> {
        while matches!(self.buf.get(self.pos), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        match self.buf.get(self.pos) {
            None => Ok(()), // wait
            Some(b':') => {
                self.pos += 1;
                self.set_state(FramerState::ConsumeSwsAfterHcolon);
                Ok(())
            }
            Some(_) => Err(Error::malformed(self.pos, "':'")),
        }
    }

    /// Second half of HCOLON: whitespace after the colon. Folds are left to
    /// the value scanner, which joins them anyway.
    fn on_sws_after_hcolon(&mut self) -> Result<()> {
        while matches!(self.buf.get(self.pos), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        if self.pos < self.buf.len() {
            let comma_separates = self
                .current_name
                .as_ref()
                .map(|c| c.name.comma_separates_values())
                .unwrap_or(true);
            self.scan = Some(ScanState::new(self.pos, comma_separates));
            self.set_state(FramerState::GetHeaderValues);
        }
        Ok(())
    }

    fn on_header_values(&mut self) -> Result<()> {
        let Some(scan) = self.scan.as_mut() else {
            return Ok(());
        };
        let outcome = scan.step(&self.buf);
        let scanned = scan.position() - self.headers_start;
        if scanned > self.config.max_headers_size {
            return Err(Error::SizeLimitExceeded {
                limit: SizeLimit::Headers,
            });
        }
        if outcome == ScanOutcome::NeedMore {
            return Ok(()); // wait
        }

        let scan = self.scan.take().ok_or(Error::MessageNotReady {
            state: self.state.name(),
        })?;
        let current = self.current_name.take().ok_or(Error::MessageNotReady {
            state: self.state.name(),
        })?;

        for span in scan.values() {
            // Completed headers route through the system framer registry
            // right away, exactly as in the batch framer; a contradiction
            // surfaces from this process() call.
            let typed = match system_framer(&current.name) {
                Some(framer) => {
                    let value = span.materialize_from(&self.buf);
                    Some(framer(&value, span.start)?)
                }
                None => None,
            };
            if current.name == HeaderName::ContentLength {
                let value = span.materialize_from(&self.buf);
                let declared = values::parse_content_length(&value, span.start)?;
                if declared > self.config.max_content_length {
                    return Err(Error::SizeLimitExceeded {
                        limit: SizeLimit::ContentLength,
                    });
                }
                self.content_length = Some(declared);
            }
            self.headers.push(PendingHeader {
                name: current.name.clone(),
                name_span: (current.start, current.stop),
                span: *span,
                typed,
            });
        }

        self.pos = scan.position();
        self.set_state(FramerState::CheckForEndOfHeaderSection);
        Ok(())
    }

    /// Decide blank-line vs next header. A single buffered byte cannot
    /// disambiguate (a lone CR could open either), so this state insists on
    /// two.
    fn on_check_end(&mut self) -> Result<()> {
        if self.buf.len() - self.pos < 2 {
            return Ok(()); // wait
        }
        if self.buf[self.pos] == b'\r' {
            // A CR opening a line is only legal as part of CRLF.
            if self.buf[self.pos + 1] != b'\n' {
                return Err(Error::malformed(self.pos + 1, "LF"));
            }
            self.pos += 2;
            self.set_state(FramerState::GetPayload);
        } else if self.buf[self.pos] == b'\n' {
            self.pos += 1;
            self.set_state(FramerState::GetPayload);
        } else {
            self.set_state(FramerState::GetHeaderName);
        }
        Ok(())
    }

    fn on_payload(&mut self) -> Result<()> {
        let need = self.content_length.unwrap_or(0);
        if need == 0 {
            self.body_span = None;
            self.set_state(FramerState::Done);
            return Ok(());
        }
        if self.buf.len() - self.pos >= need {
            self.body_span = Some((self.pos, self.pos + need));
            self.pos += need;
            self.set_state(FramerState::Done);
        }
        Ok(()) // else wait for the rest of the payload
    }
}

impl Default for StreamingFramer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &[u8] = b"INVITE sip:bob@biloxi.com SIP/2.0\r\n\
Via: SIP/2.0/UDP pc33.atlanta.com;branch=z9hG4bK776\r\n\
To: <sip:bob@biloxi.com>\r\n\
From: <sip:alice@atlanta.com>;tag=1928301774\r\n\
Call-ID: a84b4c76e66710\r\n\
CSeq: 314159 INVITE\r\n\
Content-Length: 4\r\n\
\r\n\
ping";

    #[test]
    fn test_whole_message_in_one_chunk() {
        let mut framer = StreamingFramer::new();
        assert!(framer.process(MESSAGE).unwrap());
        let msg = framer.build().unwrap();
        assert_eq!(msg.body(), b"ping");
        assert!(!framer.has_unconsumed_data());
    }

    #[test]
    fn test_one_byte_at_a_time() {
        let mut framer = StreamingFramer::new();
        let mut ready = false;
        for &b in MESSAGE {
            ready = framer.process(&[b]).unwrap();
        }
        assert!(ready);
        let msg = framer.build().unwrap();
        assert_eq!(msg.body(), b"ping");
        assert_eq!(msg.cseq().unwrap().seq, 314159);
        assert_eq!(msg.via().unwrap().branch(), Some("z9hG4bK776"));
    }

    #[test]
    fn test_incomplete_input_is_not_an_error() {
        let mut framer = StreamingFramer::new();
        // Half a message: no error, just not ready.
        assert!(!framer.process(&MESSAGE[..40]).unwrap());
        assert!(framer.build().is_err());
        assert!(framer.has_unconsumed_data());
    }

    #[test]
    fn test_pipelined_messages_share_a_chunk() {
        let mut doubled = Vec::from(MESSAGE);
        doubled.extend_from_slice(MESSAGE);

        let mut framer = StreamingFramer::new();
        assert!(framer.process(&doubled).unwrap());
        let first = framer.build().unwrap();
        assert_eq!(first.body(), b"ping");
        assert!(framer.has_unconsumed_data());

        // The leftover alone completes the second message.
        assert!(framer.process(&[]).unwrap());
        let second = framer.build().unwrap();
        assert_eq!(second.body(), b"ping");
        assert!(!framer.has_unconsumed_data());
    }

    #[test]
    fn test_wrong_version_is_contradictory() {
        let mut framer = StreamingFramer::new();
        let err = framer
            .process(b"INVITE sip:bob@biloxi.com SIP/3.0\r\n")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedGrammar { .. }));
    }

    #[test]
    fn test_initial_line_size_limit() {
        let mut framer = StreamingFramer::with_config(FramerConfig {
            max_initial_line_size: 32,
            ..FramerConfig::default()
        });
        // 40 bytes, no LF yet: over the limit, the connection is done for.
        let err = framer.process(&[b'A'; 40]).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeLimitExceeded {
                limit: SizeLimit::InitialLine
            }
        ));
    }

    #[test]
    fn test_leading_keepalive_crlfs_skipped() {
        let mut input = Vec::from(&b"\r\n\r\n"[..]);
        input.extend_from_slice(MESSAGE);
        let mut framer = StreamingFramer::new();
        assert!(framer.process(&input).unwrap());
        let msg = framer.build().unwrap();
        // to_buffer starts at the initial line, not the keep-alive bytes.
        assert!(msg.to_buffer().starts_with(b"INVITE"));
    }
}
