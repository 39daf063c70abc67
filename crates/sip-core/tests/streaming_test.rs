//! Streaming framer integration tests
//!
//! The defining property: for any chunking of the same bytes — one byte at
//! a time through the whole buffer at once — the streaming framer produces
//! a message equal, by every accessor, to the batch framer's result.

use bytes::Bytes;
use proptest::prelude::*;
use sipwire_sip_core::prelude::*;

/// A message exercising the awkward cases at once: compact names, a
/// comma-separated Via line, a quoted comma, a folded header, an
/// exception-class list, and a body.
const WIRE: &[u8] = b"INVITE sip:bob@biloxi.example.com SIP/2.0\r\n\
v: SIP/2.0/UDP a.example.com;branch=z9hG4bK1, SIP/2.0/TCP 192.0.2.7:5061;branch=z9hG4bK2\r\n\
Max-Forwards: 70\r\n\
To: \"Bob, PhD\" <sip:bob@biloxi.example.com>\r\n\
From: <sip:alice@atlanta.example.com>;tag=88sja8x\r\n\
i: 987asjd97y7atg@host\r\n\
CSeq: 986759 INVITE\r\n\
Allow: INVITE, ACK, BYE\r\n\
Subject: needs\r\n more room\r\n\
Content-Length: 11\r\n\
\r\n\
hello world";

fn batch_reference() -> SipMessage {
    frame(&Bytes::from_static(WIRE)).expect("batch frame")
}

fn assert_equivalent(streamed: &SipMessage, reference: &SipMessage) {
    assert_eq!(streamed.to_buffer(), reference.to_buffer());
    assert_eq!(
        format!("{}", streamed.start_line()),
        format!("{}", reference.start_line())
    );
    assert_eq!(streamed.headers().len(), reference.headers().len());
    for (s, r) in streamed.headers().iter().zip(reference.headers().iter()) {
        assert_eq!(s.name(), r.name());
        assert_eq!(s.raw_name(), r.raw_name());
        assert_eq!(s.value(), r.value());
    }
    assert_eq!(streamed.body(), reference.body());

    assert_eq!(streamed.vias().len(), reference.vias().len());
    for (s, r) in streamed.vias().iter().zip(reference.vias().iter()) {
        assert_eq!(s, r);
    }
    assert_eq!(streamed.to_header(), reference.to_header());
    assert_eq!(streamed.from_header(), reference.from_header());
    assert_eq!(
        streamed.call_id().unwrap().as_str(),
        reference.call_id().unwrap().as_str()
    );
    assert_eq!(streamed.cseq(), reference.cseq());
    assert_eq!(streamed.max_forwards(), reference.max_forwards());
}

fn stream_in_chunks(input: &[u8], chunk_sizes: impl Iterator<Item = usize>) -> SipMessage {
    let mut framer = StreamingFramer::new();
    let mut offset = 0;
    for size in chunk_sizes {
        if offset >= input.len() {
            break;
        }
        let end = (offset + size.max(1)).min(input.len());
        framer.process(&input[offset..end]).expect("process");
        offset = end;
    }
    assert!(offset >= input.len(), "input not fully fed");
    assert!(framer.process(&[]).expect("final process"), "not ready");
    framer.build().expect("build")
}

#[test]
fn fixed_chunk_sizes_match_batch() {
    // RUST_LOG=trace surfaces the framer's state transitions when this
    // fails.
    let _ = tracing_subscriber::fmt::try_init();
    let reference = batch_reference();
    for size in [1, 2, 3, 5, 7, 16, 64, WIRE.len()] {
        let streamed = stream_in_chunks(WIRE, std::iter::repeat(size));
        assert_equivalent(&streamed, &reference);
    }
}

#[test]
fn every_split_into_two_chunks_matches_batch() {
    let reference = batch_reference();
    for cut in 1..WIRE.len() {
        let mut framer = StreamingFramer::new();
        framer.process(&WIRE[..cut]).expect("first half");
        assert!(framer.process(&WIRE[cut..]).expect("second half"));
        assert_equivalent(&framer.build().unwrap(), &reference);
    }
}

proptest! {
    #[test]
    fn random_chunkings_match_batch(
        sizes in proptest::collection::vec(1usize..32, 8..200)
    ) {
        let reference = batch_reference();
        let streamed = stream_in_chunks(WIRE, sizes.into_iter());
        assert_equivalent(&streamed, &reference);
    }

    #[test]
    fn pipelined_pair_splits_anywhere(cut in 1usize..400) {
        let mut wire = Vec::from(WIRE);
        wire.extend_from_slice(WIRE);
        prop_assume!(cut < wire.len());

        let reference = batch_reference();
        let mut framer = StreamingFramer::new();
        framer.process(&wire[..cut]).expect("first chunk");
        framer.process(&wire[cut..]).expect("second chunk");

        let first = framer.build().expect("first message");
        assert_equivalent(&first, &reference);
        assert!(framer.has_unconsumed_data());

        assert!(framer.process(&[]).expect("drain"));
        let second = framer.build().expect("second message");
        assert_equivalent(&second, &reference);
        assert!(!framer.has_unconsumed_data());
    }
}

#[test]
fn need_more_input_is_silent() {
    let mut framer = StreamingFramer::new();
    for &b in &WIRE[..WIRE.len() - 1] {
        // No chunk boundary may surface an error for incomplete input.
        assert!(!framer.process(&[b]).expect("incomplete input is not an error"));
    }
    assert!(framer.process(&WIRE[WIRE.len() - 1..]).unwrap());
}

#[test]
fn contradictory_bytes_fail_at_the_offending_chunk() {
    let mut framer = StreamingFramer::new();
    assert!(!framer.process(b"INVITE sip:a@b SIP/2.0\r\n").unwrap());
    // A Via that cannot be a Via, completed by its CRLF and a decision byte.
    let err = framer.process(b"Via: broken!\r\nX").unwrap_err();
    assert!(matches!(err, Error::MalformedGrammar { .. }));
}

#[test]
fn headers_size_limit_applies_incrementally() {
    let mut framer = StreamingFramer::with_config(FramerConfig {
        max_headers_size: 64,
        ..FramerConfig::default()
    });
    framer.process(b"INVITE sip:a@b SIP/2.0\r\n").unwrap();
    // Feed an unterminated header name past the limit, a few bytes at a time.
    let mut result = Ok(false);
    for _ in 0..40 {
        result = framer.process(b"aaaa");
        if result.is_err() {
            break;
        }
    }
    assert!(matches!(
        result.unwrap_err(),
        Error::SizeLimitExceeded {
            limit: SizeLimit::Headers
        }
    ));
}

#[test]
fn zero_length_chunks_are_harmless() {
    let mut framer = StreamingFramer::new();
    for chunk in WIRE.chunks(9) {
        framer.process(&[]).unwrap();
        framer.process(chunk).unwrap();
    }
    assert!(framer.process(&[]).unwrap());
    let msg = framer.build().unwrap();
    assert_eq!(msg.body(), b"hello world");
}
