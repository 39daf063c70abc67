//! name-addr / addr-spec header values
//!
//! To, From, Contact, Route and Record-Route all carry the same shape:
//! `[display-name] LAQUOT addr-spec RAQUOT *(SEMI generic-param)` or a bare
//! `addr-spec *(SEMI generic-param)`. The URI is captured verbatim.

use crate::buffer::ByteCursor;
use crate::error::{Error, Result};
use crate::types::NameAddr;

use super::grammar::{
    consume_display_name, consume_generic_param, consume_separator, consume_sws,
};

/// Parse one logical header value into a [`NameAddr`].
///
/// `base` is the absolute offset of `value[0]` in the enclosing message,
/// used to tag grammar errors.
pub fn parse_name_addr(value: &[u8], base: usize) -> Result<NameAddr> {
    let mut cur = ByteCursor::new(value);
    let display_name = consume_display_name(&mut cur);
    consume_sws(&mut cur);

    let uri = if cur.peek_byte() == Some(b'<') {
        let _ = cur.skip(1);
        let rest = cur.remaining();
        let close = rest.iter().position(|&b| b == b'>').ok_or(Error::MalformedGrammar {
            offset: base + cur.capacity(),
            expected: "'>'",
        })?;
        let uri = String::from_utf8_lossy(&rest[..close]).into_owned();
        let _ = cur.skip(close + 1);
        uri
    } else {
        // Bare addr-spec: runs to the first ';' (header parameters) or the
        // end of the value.
        let rest = cur.remaining();
        let end = rest.iter().position(|&b| b == b';').unwrap_or(rest.len());
        let trimmed = trim_wsp(&rest[..end]);
        if trimmed.is_empty() {
            return Err(Error::MalformedGrammar {
                offset: base + cur.reader_index(),
                expected: "addr-spec",
            });
        }
        let _ = cur.skip(end);
        String::from_utf8_lossy(trimmed).into_owned()
    };

    let mut addr = NameAddr::new(uri);
    addr.display_name = display_name;

    while consume_separator(&mut cur, b';') {
        match consume_generic_param(&mut cur).map_err(|e| e.offset_by(base))? {
            Some(param) => addr.params.push(param),
            None => {
                return Err(Error::MalformedGrammar {
                    offset: base + cur.reader_index(),
                    expected: "parameter name",
                })
            }
        }
    }

    consume_sws(&mut cur);
    if cur.readable_bytes() > 0 {
        return Err(Error::MalformedGrammar {
            offset: base + cur.reader_index(),
            expected: "';' or end of value",
        });
    }
    Ok(addr)
}

fn trim_wsp(mut bytes: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = bytes {
        bytes = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = bytes {
        bytes = rest;
    }
    bytes
}
