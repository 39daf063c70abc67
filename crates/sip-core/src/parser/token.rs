//! Tokens and quoted strings (RFC 3261 §25.1)

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::recognize,
    multi::many0,
    sequence::delimited,
};

use super::separators::ParseResult;

/// token = 1*( alphanum / "-" / "." / "!" / "%" / "*" / "_" / "+" / "`" /
///             "'" / "~" )
pub fn is_token_char(c: u8) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            b'-' | b'.' | b'!' | b'%' | b'*' | b'_' | b'+' | b'`' | b'\'' | b'~'
        )
}

/// One or more token characters.
pub fn token(input: &[u8]) -> ParseResult<&[u8]> {
    take_while1(is_token_char)(input)
}

/// quoted-string: DQUOTE-delimited, backslash escapes exactly the following
/// byte, content may be empty. Returns the raw span *including* the quotes.
pub fn quoted_string(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(delimited(
        tag(b"\""),
        many0(alt((
            recognize(nom::sequence::preceded(
                tag(b"\\"),
                nom::bytes::complete::take(1usize),
            )),
            take_while1(|c| c != b'"' && c != b'\\'),
        ))),
        tag(b"\""),
    ))(input)
}

/// Strip the surrounding quotes and resolve backslash escapes of a span
/// produced by [`quoted_string`].
pub fn unquote(raw: &[u8]) -> Vec<u8> {
    debug_assert!(raw.len() >= 2 && raw[0] == b'"' && raw[raw.len() - 1] == b'"');
    let mut out = Vec::with_capacity(raw.len() - 2);
    let mut escaped = false;
    for &b in &raw[1..raw.len() - 1] {
        if escaped {
            out.push(b);
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else {
            out.push(b);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_char_class() {
        for c in "abcXYZ019-.!%*_+`'~".bytes() {
            assert!(is_token_char(c), "{}", c as char);
        }
        for c in "()<>@,;:\\\"/[]?={} \t".bytes() {
            assert!(!is_token_char(c), "{}", c as char);
        }
    }

    #[test]
    fn test_token() {
        assert_eq!(token(b"z9hG4bK;x").unwrap(), (&b";x"[..], &b"z9hG4bK"[..]));
        assert!(token(b";x").is_err());
        assert!(token(b"").is_err());
    }

    #[test]
    fn test_quoted_string() {
        let (rem, raw) = quoted_string(b"\"Alice\" <sip:a>").unwrap();
        assert_eq!(raw, b"\"Alice\"");
        assert_eq!(rem, b" <sip:a>");

        // Empty content is legal.
        let (_, raw) = quoted_string(b"\"\"").unwrap();
        assert_eq!(raw, b"\"\"");

        // Backslash escapes one byte, including a quote.
        let (_, raw) = quoted_string(br#""a\"b""#).unwrap();
        assert_eq!(raw, br#""a\"b""#);
        assert_eq!(unquote(raw), b"a\"b");

        // Unterminated.
        assert!(quoted_string(b"\"abc").is_err());
    }
}
