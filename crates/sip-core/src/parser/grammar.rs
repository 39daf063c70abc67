//! Cursor-level grammar primitives
//!
//! Thin stateful wrappers that run the lexical rules against a
//! [`ByteCursor`] and advance it past whatever matched. Each rule comes in
//! two flavors: `consume_*` returns `None`/`false` and leaves the cursor
//! untouched on a mismatch; `expect_*` returns a [`MalformedGrammar`] error
//! tagged with the offset of the offending byte.
//!
//! [`MalformedGrammar`]: crate::error::Error::MalformedGrammar

use crate::buffer::ByteCursor;
use crate::error::{Error, Result};
use crate::types::Param;

use super::host::scan_host;
use super::separators::{self, sws};
use super::token::{quoted_string, token, unquote};

/// Advance the cursor past whatever a slice-level parser consumed.
fn advance_past<'a>(cur: &mut ByteCursor<'a>, rest_before: &[u8], rest_after: &[u8]) {
    // Both slices come from this cursor's storage, so the length delta is
    // exactly what the parser consumed.
    let consumed = rest_before.len() - rest_after.len();
    let _ = cur.skip(consumed);
}

/// Consume optional linear whitespace (SWS), including folds.
pub fn consume_sws(cur: &mut ByteCursor<'_>) {
    let rest = cur.remaining();
    if let Ok((left, _)) = sws(rest) {
        advance_past(cur, rest, left);
    }
}

/// Consume one token, if present.
pub fn consume_token<'a>(cur: &mut ByteCursor<'a>) -> Option<&'a [u8]> {
    let rest = cur.remaining();
    match token(rest) {
        Ok((left, tok)) => {
            advance_past(cur, rest, left);
            Some(tok)
        }
        Err(_) => None,
    }
}

/// Require one token.
pub fn expect_token<'a>(cur: &mut ByteCursor<'a>) -> Result<&'a [u8]> {
    let offset = cur.reader_index();
    consume_token(cur).ok_or(Error::MalformedGrammar {
        offset,
        expected: "token",
    })
}

/// Consume a quoted string, returning the raw span including the quotes.
pub fn consume_quoted_string<'a>(cur: &mut ByteCursor<'a>) -> Option<&'a [u8]> {
    let rest = cur.remaining();
    match quoted_string(rest) {
        Ok((left, raw)) => {
            advance_past(cur, rest, left);
            Some(raw)
        }
        Err(_) => None,
    }
}

/// Require a quoted string.
pub fn expect_quoted_string<'a>(cur: &mut ByteCursor<'a>) -> Result<&'a [u8]> {
    let offset = cur.reader_index();
    consume_quoted_string(cur).ok_or(Error::MalformedGrammar {
        offset,
        expected: "quoted string",
    })
}

/// Consume `SWS sep SWS`. Returns false (cursor untouched) on a mismatch.
pub fn consume_separator(cur: &mut ByteCursor<'_>, sep: u8) -> bool {
    let rest = cur.remaining();
    match separators::separator(rest, sep) {
        Ok((left, _)) => {
            advance_past(cur, rest, left);
            true
        }
        Err(_) => false,
    }
}

/// Require `SWS sep SWS`.
pub fn expect_separator(cur: &mut ByteCursor<'_>, sep: u8, expected: &'static str) -> Result<()> {
    let rest = cur.remaining();
    match separators::separator(rest, sep) {
        Ok((left, _)) => {
            advance_past(cur, rest, left);
            Ok(())
        }
        Err(_) => {
            // The separator was expected right after any leading whitespace.
            let skipped = sws(rest)
                .map(|(left, _)| rest.len() - left.len())
                .unwrap_or(0);
            Err(Error::MalformedGrammar {
                offset: cur.reader_index() + skipped,
                expected,
            })
        }
    }
}

/// Require `HCOLON = *( SP / HTAB ) ":" SWS`.
pub fn expect_hcolon(cur: &mut ByteCursor<'_>) -> Result<()> {
    let rest = cur.remaining();
    match separators::hcolon(rest) {
        Ok((left, _)) => {
            advance_past(cur, rest, left);
            Ok(())
        }
        Err(_) => {
            // The colon was expected right after the run of SP/HTAB.
            let wsp = rest
                .iter()
                .take_while(|&&b| b == b' ' || b == b'\t')
                .count();
            Err(Error::MalformedGrammar {
                offset: cur.reader_index() + wsp,
                expected: "':'",
            })
        }
    }
}

/// Require `sent-protocol = "SIP/2.0/" transport-token` and return the
/// transport token.
pub fn expect_sent_protocol<'a>(cur: &mut ByteCursor<'a>) -> Result<&'a [u8]> {
    let rest = cur.remaining();
    if !rest.starts_with(b"SIP/2.0/") {
        return Err(Error::MalformedGrammar {
            offset: cur.reader_index(),
            expected: "SIP/2.0",
        });
    }
    let _ = cur.skip(b"SIP/2.0/".len());
    expect_token(cur)
}

/// Consume `token [ "=" (token | quoted-string | host) ]`.
///
/// The trailing bare `=` form (`;name=`) is illegal but tolerated; it yields
/// `Some("")` as the value. Returns `Ok(None)` when no parameter name is
/// present.
pub fn consume_generic_param(cur: &mut ByteCursor<'_>) -> Result<Option<Param>> {
    let Some(name) = consume_token(cur) else {
        return Ok(None);
    };
    let name = String::from_utf8_lossy(name).into_owned();

    if !consume_separator(cur, b'=') {
        return Ok(Some(Param::flag(name)));
    }

    if cur.peek_byte() == Some(b'"') {
        let raw = expect_quoted_string(cur)?;
        let value = String::from_utf8_lossy(&unquote(raw)).into_owned();
        return Ok(Some(Param::new(name, Some(value))));
    }
    if let Some(tok) = consume_token(cur) {
        let value = String::from_utf8_lossy(tok).into_owned();
        return Ok(Some(Param::new(name, Some(value))));
    }
    if cur.peek_byte() == Some(b'[') {
        let rest = cur.remaining();
        let (host, consumed) = scan_host(rest, cur.reader_index())?;
        let _ = cur.skip(consumed);
        return Ok(Some(Param::new(name, Some(host.to_string()))));
    }
    // Tolerated bare `=` with nothing after it.
    Ok(Some(Param::new(name, Some(String::new()))))
}

/// Consume a display name, if the bytes ahead really are one.
///
/// `display-name = *(token LWS) | quoted-string`. The unquoted form is
/// ambiguous with the start of an addr-spec: a lone token immediately
/// followed by `:` is a URI scheme, not a display name, so the look-ahead
/// un-consumes it (mark/reset) and reports no display name.
pub fn consume_display_name(cur: &mut ByteCursor<'_>) -> Option<String> {
    consume_sws(cur);
    if cur.peek_byte() == Some(b'"') {
        let raw = consume_quoted_string(cur)?;
        return Some(String::from_utf8_lossy(&unquote(raw)).into_owned());
    }

    cur.mark();
    let start = cur.reader_index();
    let mut end = start;
    while consume_token(cur).is_some() {
        if cur.peek_byte() == Some(b':') {
            // Token turned out to be a URI scheme.
            cur.reset();
            return None;
        }
        end = cur.reader_index();
        consume_sws(cur);
    }
    if end == start {
        cur.reset();
        return None;
    }
    let span = cur
        .slice(start, end)
        .map(|c| String::from_utf8_lossy(c.remaining()).into_owned());
    match span {
        Ok(name) => Some(name),
        Err(_) => {
            cur.reset();
            None
        }
    }
}
