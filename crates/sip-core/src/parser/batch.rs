//! Batch framer: one complete in-memory message
//!
//! [`frame`] parses a fully-buffered datagram into a [`SipMessage`]. The
//! resulting message aliases the input buffer — the initial line, header
//! values and body are zero-copy slices of `[start-of-initial-line,
//! end-of-body)` — and every parse failure carries the exact byte offset at
//! which it occurred.

use bytes::Bytes;
use tracing::debug;

use crate::buffer::ByteCursor;
use crate::config::FramerConfig;
use crate::error::{Error, Result, SizeLimit};
use crate::parser::grammar::{expect_hcolon, expect_token};
use crate::parser::scanner::{ScanOutcome, ScanState};
use crate::parser::token::is_token_char;
use crate::parser::values;
use crate::types::{
    header::system_framer, HeaderName, HeaderSlice, Method, RequestLine, SipMessage, StartLine,
    StatusLine,
};

/// Frame one message with default limits.
pub fn frame(buffer: &Bytes) -> Result<SipMessage> {
    frame_with_config(buffer, &FramerConfig::default())
}

/// Frame one message.
pub fn frame_with_config(buffer: &Bytes, config: &FramerConfig) -> Result<SipMessage> {
    let mut cur = ByteCursor::new(buffer);

    // Tolerant stream prefix: keep-alive CRLFs and stray whitespace.
    while matches!(cur.peek_byte(), Some(b'\r' | b'\n' | b' ' | b'\t')) {
        let _ = cur.skip(1);
    }
    let msg_start = cur.reader_index();

    let line = match cur.read_line(config.max_initial_line_size) {
        Ok(line) => line,
        Err(err) if !err.is_starved() => {
            return Err(Error::SizeLimitExceeded {
                limit: SizeLimit::InitialLine,
            })
        }
        Err(err) => return Err(err),
    };
    let start_line = parse_start_line(line, msg_start)?;

    let headers_start = cur.reader_index();
    let mut headers: Vec<HeaderSlice> = Vec::new();
    let mut content_length: Option<usize> = None;

    loop {
        // Blank line ends the header section.
        match cur.peek_byte() {
            Some(b'\r') if cur.get_byte(cur.reader_index() + 1).ok() == Some(b'\n') => {
                let _ = cur.skip(2);
                break;
            }
            Some(b'\n') => {
                let _ = cur.skip(1);
                break;
            }
            None => {
                return Err(Error::TerminatorNotFound {
                    scanned: cur.reader_index() - headers_start,
                    limit: config.max_headers_size,
                })
            }
            Some(_) => {}
        }

        let budget = config
            .max_headers_size
            .saturating_sub(cur.reader_index() - headers_start);
        let name_offset = cur.reader_index();
        let raw_name = match cur.read_until(budget, b" \t:") {
            Ok(name) => name,
            Err(err) if !err.is_starved() => {
                return Err(Error::SizeLimitExceeded {
                    limit: SizeLimit::Headers,
                })
            }
            Err(err) => return Err(err),
        };
        if raw_name.is_empty() {
            return Err(Error::malformed(name_offset, "header name"));
        }
        if let Some(bad) = raw_name.iter().position(|&b| !is_token_char(b)) {
            return Err(Error::malformed(name_offset + bad, "header name"));
        }
        let name = HeaderName::from_bytes(raw_name)
            .map_err(|e| e.offset_by(name_offset))?;

        expect_hcolon(&mut cur)?;

        let mut scan = ScanState::new(cur.reader_index(), name.comma_separates_values());
        if scan.step(buffer) == ScanOutcome::NeedMore {
            return Err(Error::TerminatorNotFound {
                scanned: scan.position() - headers_start,
                limit: config.max_headers_size,
            });
        }
        if scan.position() - headers_start > config.max_headers_size {
            return Err(Error::SizeLimitExceeded {
                limit: SizeLimit::Headers,
            });
        }
        cur.set_reader_index(scan.position())?;

        for span in scan.values() {
            let value = span.materialize(buffer);
            let slice = HeaderSlice::new(
                name.clone(),
                buffer.slice(name_offset..name_offset + raw_name.len()),
                value,
            );
            // System headers are framed eagerly; a contradiction here is a
            // parse failure of the whole message.
            if let Some(framer) = system_framer(&name) {
                let typed = framer(slice.value(), span.start)?;
                slice.memoize(typed);
            }
            if name == HeaderName::ContentLength {
                let declared = values::parse_content_length(slice.value(), span.start)?;
                if declared > config.max_content_length {
                    return Err(Error::SizeLimitExceeded {
                        limit: SizeLimit::ContentLength,
                    });
                }
                content_length = Some(declared);
            }
            headers.push(slice);
        }
    }

    // Body only when Content-Length was declared; capped by what is
    // actually available.
    let body = match content_length {
        Some(declared) => {
            let take = declared.min(cur.readable_bytes());
            let body = buffer.slice(cur.reader_index()..cur.reader_index() + take);
            let _ = cur.skip(take);
            Some(body)
        }
        None => None,
    };

    let message = SipMessage::new(
        buffer.slice(msg_start..cur.reader_index()),
        start_line,
        headers,
        body,
    );
    debug!(
        start_line = %message.start_line(),
        headers = message.headers().len(),
        body_len = message.body().len(),
        "framed message"
    );
    Ok(message)
}

/// Parse a request-line or status-line (already stripped of its CRLF).
/// `base` is the absolute offset of `line[0]`.
pub(crate) fn parse_start_line(line: &[u8], base: usize) -> Result<StartLine> {
    if line.starts_with(b"SIP/") {
        parse_status_line(line, base)
    } else {
        parse_request_line(line, base)
    }
}

fn parse_status_line(line: &[u8], base: usize) -> Result<StartLine> {
    let mut cur = ByteCursor::new(line);
    if !line.starts_with(b"SIP/2.0") {
        return Err(Error::malformed(base, "SIP/2.0"));
    }
    let _ = cur.skip(b"SIP/2.0".len());
    if cur.read_byte().ok() != Some(b' ') {
        return Err(Error::malformed(base + cur.reader_index(), "' '"));
    }
    let code_offset = cur.reader_index();
    let code = cur.parse_to_int(10).map_err(|e| e.offset_by(base))?;
    if !(100..=699).contains(&code) {
        return Err(Error::malformed(base + code_offset, "status code"));
    }
    let reason = match cur.peek_byte() {
        None => String::new(),
        Some(b' ') => {
            let _ = cur.skip(1);
            String::from_utf8_lossy(cur.remaining()).into_owned()
        }
        Some(_) => return Err(Error::malformed(base + cur.reader_index(), "' '")),
    };
    Ok(StartLine::Status(StatusLine::new(code as u16, reason)))
}

fn parse_request_line(line: &[u8], base: usize) -> Result<StartLine> {
    let mut cur = ByteCursor::new(line);
    let method_token = expect_token(&mut cur).map_err(|e| e.offset_by(base))?;
    let method = Method::from_token(method_token).map_err(|e| e.offset_by(base))?;

    if cur.read_byte().ok() != Some(b' ') {
        return Err(Error::malformed(base + cur.reader_index(), "' '"));
    }

    let uri_offset = cur.reader_index();
    let uri = match cur.read_until(cur.readable_bytes() + 1, b" ") {
        Ok(uri) => uri,
        Err(_) => return Err(Error::malformed(base + line.len(), "SIP/2.0")),
    };
    if uri.is_empty() {
        return Err(Error::malformed(base + uri_offset, "request-URI"));
    }
    let _ = cur.skip(1); // the SP

    if cur.remaining() != b"SIP/2.0" {
        return Err(Error::malformed(base + cur.reader_index(), "SIP/2.0"));
    }
    let uri = String::from_utf8_lossy(uri).into_owned();
    Ok(StartLine::Request(RequestLine::new(method, uri)))
}
