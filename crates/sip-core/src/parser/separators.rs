//! Separators and linear whitespace (RFC 3261 §25.1)
//!
//! SIP wraps most separators in optional linear whitespace, and linear
//! whitespace itself may hide a folded line: `LWS = [*WSP CRLF] 1*WSP`.
//! These rules are hot enough that they are scanned directly instead of
//! being assembled from combinators; they still speak the same `IResult`
//! protocol as the rest of the lexical layer. HCOLON is the odd one out
//! among the separators: `*( SP / HTAB ) ":" SWS`.

use nom::error::{Error as NomError, ErrorKind};
use nom::IResult;

/// Type alias for parser results over raw bytes
pub type ParseResult<'a, O> = IResult<&'a [u8], O>;

/// SP or HTAB
pub fn is_wsp(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn mismatch(input: &[u8], kind: ErrorKind) -> nom::Err<NomError<&[u8]>> {
    nom::Err::Error(NomError::new(input, kind))
}

/// Length of the LWS run at the start of `input`, if any: a run of WSP that
/// may continue across one folded line ending (CRLF, or tolerated bare LF,
/// followed by at least one more WSP).
fn lws_len(input: &[u8]) -> Option<usize> {
    let mut i = 0;
    while input.get(i).copied().is_some_and(is_wsp) {
        i += 1;
    }
    let continued = match input.get(i) {
        Some(b'\r') if input.get(i + 1) == Some(&b'\n') => i + 2,
        Some(b'\n') => i + 1,
        // No line break: plain whitespace, or nothing.
        _ => return (i > 0).then_some(i),
    };
    let mut j = continued;
    while input.get(j).copied().is_some_and(is_wsp) {
        j += 1;
    }
    if j > continued {
        Some(j)
    } else {
        // The break had no continuation whitespace: it is a line end, not a
        // fold, and only the WSP before it belongs to the whitespace run.
        (i > 0).then_some(i)
    }
}

/// LWS = [*WSP CRLF] 1*WSP — whitespace that may span a folded line.
pub fn lws(input: &[u8]) -> ParseResult<&[u8]> {
    match lws_len(input) {
        Some(n) => Ok((&input[n..], &input[..n])),
        None => Err(mismatch(input, ErrorKind::Space)),
    }
}

/// SWS = [LWS] — optional linear whitespace. Never fails.
pub fn sws(input: &[u8]) -> ParseResult<&[u8]> {
    let n = lws_len(input).unwrap_or(0);
    Ok((&input[n..], &input[..n]))
}

/// HCOLON = *( SP / HTAB ) ":" SWS — the header name/value separator.
pub fn hcolon(input: &[u8]) -> ParseResult<&[u8]> {
    let mut i = 0;
    while input.get(i).copied().is_some_and(is_wsp) {
        i += 1;
    }
    if input.get(i) != Some(&b':') {
        return Err(mismatch(input, ErrorKind::Char));
    }
    let (rest, _) = sws(&input[i + 1..])?;
    let consumed = input.len() - rest.len();
    Ok((rest, &input[..consumed]))
}

/// A single separator byte wrapped in optional whitespace: `SWS sep SWS`.
pub fn separator(input: &[u8], sep: u8) -> ParseResult<&[u8]> {
    let (rest, _) = sws(input)?;
    if rest.first() != Some(&sep) {
        return Err(mismatch(input, ErrorKind::Char));
    }
    let (rest, _) = sws(&rest[1..])?;
    let consumed = input.len() - rest.len();
    Ok((rest, &input[..consumed]))
}

/// SEMI = SWS ";" SWS
pub fn semi(input: &[u8]) -> ParseResult<&[u8]> {
    separator(input, b';')
}

/// COMMA = SWS "," SWS
pub fn comma(input: &[u8]) -> ParseResult<&[u8]> {
    separator(input, b',')
}

/// EQUAL = SWS "=" SWS
pub fn equal(input: &[u8]) -> ParseResult<&[u8]> {
    separator(input, b'=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sws_matches_empty_lws_does_not() {
        assert_eq!(sws(b"x").unwrap(), (&b"x"[..], &b""[..]));
        assert_eq!(sws(b" \t x").unwrap(), (&b"x"[..], &b" \t "[..]));
        assert_eq!(sws(b"").unwrap(), (&b""[..], &b""[..]));
        assert!(lws(b"x").is_err());
        assert!(lws(b"").is_err());
        assert_eq!(lws(b"  x").unwrap(), (&b"x"[..], &b"  "[..]));
    }

    #[test]
    fn test_lws_folding() {
        // A folded continuation is whitespace.
        assert_eq!(lws(b"\r\n x").unwrap(), (&b"x"[..], &b"\r\n "[..]));
        assert_eq!(lws(b" \r\n\t x").unwrap(), (&b"x"[..], &b" \r\n\t "[..]));
        // Bare LF folds are tolerated on input.
        assert_eq!(lws(b"\n  x").unwrap(), (&b"x"[..], &b"\n  "[..]));

        // A break with no continuation whitespace is a line end; preceding
        // WSP stays plain whitespace.
        assert!(lws(b"\r\nx").is_err());
        assert_eq!(lws(b" \r\nx").unwrap(), (&b"\r\nx"[..], &b" "[..]));
    }

    #[test]
    fn test_hcolon() {
        // Whitespace is allowed before the colon and after it.
        let (rest, matched) = hcolon(b" \t: value").unwrap();
        assert_eq!(matched, b" \t: ");
        assert_eq!(rest, b"value");
        assert_eq!(hcolon(b":value").unwrap().0, b"value");
        // The SWS after the colon may fold.
        assert_eq!(hcolon(b":\r\n value").unwrap().0, b"value");
        assert!(hcolon(b"value").is_err());
        assert!(hcolon(b"  value").is_err());
    }

    #[test]
    fn test_wrapped_separators() {
        assert_eq!(semi(b" ; x").unwrap().0, b"x");
        assert_eq!(comma(b", x").unwrap().0, b"x");
        assert_eq!(equal(b"=x").unwrap().0, b"x");
        assert_eq!(separator(b" < a", b'<').unwrap().0, b"a");
        assert!(semi(b"x").is_err());
        assert!(comma(b";x").is_err());
    }
}
