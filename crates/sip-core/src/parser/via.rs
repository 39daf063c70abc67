//! Via header values
//!
//! `via-parm = sent-protocol LWS sent-by *( SEMI via-params )` with
//! `sent-protocol = "SIP/2.0/" transport` and `sent-by = host [":" port]`.

use crate::buffer::ByteCursor;
use crate::error::{Error, Result};
use crate::types::Via;

use super::grammar::{
    consume_generic_param, consume_separator, consume_sws, expect_sent_protocol,
};
use super::host::scan_host;

/// Parse one logical Via value (one hop entry).
pub fn parse_via(value: &[u8], base: usize) -> Result<Via> {
    let mut cur = ByteCursor::new(value);
    consume_sws(&mut cur);

    let transport = expect_sent_protocol(&mut cur).map_err(|e| e.offset_by(base))?;
    let transport = String::from_utf8_lossy(transport).into_owned();

    // LWS between sent-protocol and sent-by is mandatory.
    let before = cur.reader_index();
    consume_sws(&mut cur);
    if cur.reader_index() == before {
        return Err(Error::MalformedGrammar {
            offset: base + before,
            expected: "whitespace before sent-by",
        });
    }

    let rest = cur.remaining();
    let (host, consumed) = scan_host(rest, base + cur.reader_index())?;
    let _ = cur.skip(consumed);

    let port = if cur.peek_byte() == Some(b':') {
        let _ = cur.skip(1);
        let port_offset = cur.reader_index();
        let n = cur.parse_to_int(10).map_err(|e| e.offset_by(base))?;
        if !(0..=0xFFFF).contains(&n) {
            return Err(Error::MalformedGrammar {
                offset: base + port_offset,
                expected: "port",
            });
        }
        Some(n as u16)
    } else {
        None
    };

    let mut via = Via::new(transport, host, port);
    while consume_separator(&mut cur, b';') {
        match consume_generic_param(&mut cur).map_err(|e| e.offset_by(base))? {
            Some(param) => via.params.push(param),
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
    Ok(via)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Host;

    #[test]
    fn test_full_via() {
        let via = parse_via(b"SIP/2.0/UDP pc33.atlanta.com:5060;branch=z9hG4bK776", 0).unwrap();
        assert_eq!(via.transport, "UDP");
        assert_eq!(via.host, Host::Domain("pc33.atlanta.com".into()));
        assert_eq!(via.port, Some(5060));
        assert_eq!(via.branch(), Some("z9hG4bK776"));
    }

    #[test]
    fn test_ipv4_and_ipv6_sent_by() {
        let via = parse_via(b"SIP/2.0/TCP 192.0.2.4;branch=z9hG4bKnashds7", 0).unwrap();
        assert_eq!(via.host, Host::Ipv4("192.0.2.4".parse().unwrap()));
        assert_eq!(via.port, None);

        let via = parse_via(b"SIP/2.0/TLS [2001:db8::9]:5061;branch=z9hG4bK9", 0).unwrap();
        assert_eq!(via.host, Host::Ipv6("2001:db8::9".parse().unwrap()));
        assert_eq!(via.port, Some(5061));
    }

    #[test]
    fn test_wrong_version_offset() {
        let err = parse_via(b"SIP/3.0/UDP host", 100).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedGrammar {
                offset: 100,
                expected: "SIP/2.0"
            }
        ));
    }

    #[test]
    fn test_port_out_of_range() {
        assert!(parse_via(b"SIP/2.0/UDP host:70000", 0).is_err());
    }

    #[test]
    fn test_flag_and_valued_params() {
        let via = parse_via(b"SIP/2.0/UDP host;rport;received=192.0.2.1", 0).unwrap();
        assert_eq!(via.param("rport"), Some(None));
        assert_eq!(via.param("received").flatten(), Some("192.0.2.1"));
    }
}
