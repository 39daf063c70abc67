//! Simple typed header values: CSeq, Call-ID, Max-Forwards, Content-Length

use crate::buffer::ByteCursor;
use crate::error::{Error, Result};
use crate::types::{CSeq, CallId, MaxForwards, Method};

use super::grammar::{consume_sws, expect_token};

/// `CSeq = 1*DIGIT LWS Method`
pub fn parse_cseq(value: &[u8], base: usize) -> Result<CSeq> {
    let mut cur = ByteCursor::new(value);
    consume_sws(&mut cur);
    let seq = cur.parse_to_int(10).map_err(|e| e.offset_by(base))?;
    if seq < 0 {
        return Err(Error::MalformedGrammar {
            offset: base,
            expected: "sequence number",
        });
    }
    consume_sws(&mut cur);
    let token = expect_token(&mut cur).map_err(|e| e.offset_by(base))?;
    let method = Method::from_token(token).map_err(|e| e.offset_by(base))?;
    consume_sws(&mut cur);
    if cur.readable_bytes() > 0 {
        return Err(Error::MalformedGrammar {
            offset: base + cur.reader_index(),
            expected: "end of value",
        });
    }
    Ok(CSeq::new(seq as u32, method))
}

/// `Call-ID = word [ "@" word ]` — stored verbatim, required non-empty.
pub fn parse_call_id(value: &[u8], base: usize) -> Result<CallId> {
    let trimmed = trim_wsp(value);
    if trimmed.is_empty() {
        return Err(Error::MalformedGrammar {
            offset: base,
            expected: "call identifier",
        });
    }
    let s = std::str::from_utf8(trimmed).map_err(|_| Error::MalformedGrammar {
        offset: base,
        expected: "call identifier",
    })?;
    Ok(CallId::new(s))
}

/// `Max-Forwards = 1*DIGIT`
pub fn parse_max_forwards(value: &[u8], base: usize) -> Result<MaxForwards> {
    let mut cur = ByteCursor::new(value);
    consume_sws(&mut cur);
    let hops = cur.parse_to_int(10).map_err(|e| e.offset_by(base))?;
    consume_sws(&mut cur);
    if hops < 0 || cur.readable_bytes() > 0 {
        return Err(Error::MalformedGrammar {
            offset: base,
            expected: "hop count",
        });
    }
    Ok(MaxForwards::new(hops as u32))
}

/// `Content-Length = 1*DIGIT`
pub fn parse_content_length(value: &[u8], base: usize) -> Result<usize> {
    let mut cur = ByteCursor::new(value);
    consume_sws(&mut cur);
    let len = cur.parse_to_int(10).map_err(|e| e.offset_by(base))?;
    consume_sws(&mut cur);
    if len < 0 || cur.readable_bytes() > 0 {
        return Err(Error::MalformedGrammar {
            offset: base,
            expected: "content length",
        });
    }
    Ok(len as usize)
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
