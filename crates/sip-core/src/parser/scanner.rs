//! Resumable header-value scanner
//!
//! Positioned just after HCOLON, the scanner turns everything up to the end
//! of the (possibly folded) header line into one or more logical values:
//!
//! - a value ends at LF, optionally preceded by CR;
//! - if SP/HTAB follows the terminator, the line is folded and the value
//!   keeps accumulating, with a single space owed at the fold point;
//! - a literal comma ends a value only outside quoted strings, and only for
//!   headers where the comma is a separator (the Date/Allow/Subject/
//!   Allow-Events class carries it as data);
//! - DQUOTE toggles quoting, and a backslash inside quotes escapes exactly
//!   the next byte.
//!
//! All progress lives in an explicit [`ScanState`], so the scanner can be
//! re-invoked on newly arrived bytes without rescanning anything — the
//! streaming framer never needs a complete header line in hand before
//! making progress. A full line always ends with one byte of look-ahead
//! past its LF (the fold-decision byte); [`ScanOutcome::NeedMore`] reports
//! that the decision byte (or anything earlier) has not arrived yet.

use bytes::Bytes;

/// One logical value, as a span of the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueSpan {
    /// Absolute start offset of the raw value bytes
    pub start: usize,
    /// Absolute end offset (exclusive)
    pub stop: usize,
    /// The span crosses at least one fold and needs unfolding when read
    pub folded: bool,
}

impl ValueSpan {
    /// Materialize the logical value: a zero-copy slice of `buffer` when the
    /// source was a single line, an owned unfolded copy otherwise.
    pub fn materialize(&self, buffer: &Bytes) -> Bytes {
        let raw = buffer.slice(self.start..self.stop);
        if self.folded {
            Bytes::from(trim_owned(unfold_lws(&raw)))
        } else {
            raw
        }
    }

    /// Materialize against a plain slice, always copying when folded.
    pub fn materialize_from(&self, bytes: &[u8]) -> Vec<u8> {
        let raw = &bytes[self.start..self.stop];
        if self.folded {
            trim_owned(unfold_lws(raw))
        } else {
            raw.to_vec()
        }
    }
}

/// Result of one scanner step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The header line has not fully arrived; call `step` again once more
    /// bytes are buffered.
    NeedMore,
    /// All values of this header are complete. The scan position sits on
    /// the first byte after the final line terminator.
    Done,
}

/// Explicit, resumable scanner state.
#[derive(Debug, Clone)]
pub struct ScanState {
    /// Start of the value currently accumulating
    start: usize,
    /// Scan position; bytes before it are fully classified
    stop: usize,
    found_cr: bool,
    found_lf: bool,
    found_comma: bool,
    in_quotes: bool,
    escaped: bool,
    folded: bool,
    done: bool,
    comma_separates: bool,
    values: Vec<ValueSpan>,
}

impl ScanState {
    /// Start scanning at absolute offset `start` (just past HCOLON).
    /// `comma_separates` reflects the header's multi-value class.
    pub fn new(start: usize, comma_separates: bool) -> Self {
        Self {
            start,
            stop: start,
            found_cr: false,
            found_lf: false,
            found_comma: false,
            in_quotes: false,
            escaped: false,
            folded: false,
            done: false,
            comma_separates,
            values: Vec::new(),
        }
    }

    /// Current scan position (absolute).
    pub fn position(&self) -> usize {
        self.stop
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Completed value spans, valid once `step` returned [`ScanOutcome::Done`].
    pub fn values(&self) -> &[ValueSpan] {
        &self.values
    }

    /// Advance over whatever new bytes `buf` holds beyond the current scan
    /// position. `buf` must always be the same stream, only longer.
    pub fn step(&mut self, buf: &[u8]) -> ScanOutcome {
        if self.done {
            return ScanOutcome::Done;
        }
        while self.stop < buf.len() || self.found_lf {
            // A finished line: the byte after its LF decides fold vs end.
            if self.found_lf {
                match buf.get(self.stop) {
                    None => return ScanOutcome::NeedMore,
                    Some(b' ') | Some(b'\t') => {
                        // Folded continuation, same value keeps going.
                        self.folded = true;
                        self.found_cr = false;
                        self.found_lf = false;
                        self.stop += 1;
                        continue;
                    }
                    Some(_) => {
                        let end = self.stop - 1 - usize::from(self.found_cr);
                        self.push_value(buf, end);
                        self.done = true;
                        return ScanOutcome::Done;
                    }
                }
            }

            // Whitespace right after a separating comma belongs to the
            // separator, not the next value.
            if self.found_comma {
                if matches!(buf[self.stop], b' ' | b'\t') {
                    self.stop += 1;
                    self.start = self.stop;
                    continue;
                }
                self.found_comma = false;
            }

            let b = buf[self.stop];
            if self.escaped {
                self.escaped = false;
                self.stop += 1;
                continue;
            }
            match b {
                b'\\' if self.in_quotes => {
                    self.escaped = true;
                    self.stop += 1;
                }
                b'"' => {
                    self.in_quotes = !self.in_quotes;
                    self.stop += 1;
                }
                b'\r' => {
                    // Only meaningful directly before LF; a lone CR is data.
                    match buf.get(self.stop + 1) {
                        None => {
                            return ScanOutcome::NeedMore;
                        }
                        Some(b'\n') => {
                            self.found_cr = true;
                            self.found_lf = true;
                            self.stop += 2;
                        }
                        Some(_) => {
                            self.stop += 1;
                        }
                    }
                }
                b'\n' => {
                    self.found_cr = false;
                    self.found_lf = true;
                    self.stop += 1;
                }
                b',' if self.comma_separates && !self.in_quotes => {
                    self.push_value(buf, self.stop);
                    self.found_comma = true;
                    self.stop += 1;
                    self.start = self.stop;
                }
                _ => {
                    self.stop += 1;
                }
            }
        }
        ScanOutcome::NeedMore
    }

    fn push_value(&mut self, buf: &[u8], end: usize) {
        // Values are trimmed of surrounding SP/HTAB; the bytes stay in the
        // buffer, only the span tightens.
        let mut start = self.start;
        let mut stop = end.max(start);
        while start < stop && (buf[start] == b' ' || buf[start] == b'\t') {
            start += 1;
        }
        while stop > start && (buf[stop - 1] == b' ' || buf[stop - 1] == b'\t') {
            stop -= 1;
        }
        self.values.push(ValueSpan {
            start,
            stop,
            folded: self.folded,
        });
        self.folded = false;
    }
}

/// Join folded lines: each `CRLF 1*WSP` (or bare-LF fold) run collapses to a
/// single space, and runs of plain WSP collapse with it.
pub(crate) fn unfold_lws(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let at_fold = match input[i] {
            b'\r' if input.get(i + 1) == Some(&b'\n') => {
                matches!(input.get(i + 2), Some(b' ') | Some(b'\t'))
            }
            b'\n' => matches!(input.get(i + 1), Some(b' ') | Some(b'\t')),
            _ => false,
        };
        if at_fold {
            // Skip the terminator and the whole whitespace run after it.
            i += if input[i] == b'\r' { 2 } else { 1 };
            while matches!(input.get(i), Some(b' ') | Some(b'\t')) {
                i += 1;
            }
            if !matches!(out.last(), Some(b' ')) {
                out.push(b' ');
            }
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    out
}

/// Unfolding can leave separator whitespace at the edges (a value that
/// starts or ends at a fold); drop it.
fn trim_owned(mut value: Vec<u8>) -> Vec<u8> {
    while value.last().is_some_and(|&b| b == b' ' || b == b'\t') {
        value.pop();
    }
    match value.iter().position(|&b| b != b' ' && b != b'\t') {
        Some(n) => {
            value.drain(..n);
        }
        None => value.clear(),
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run the scanner over `input` one byte at a time, the worst-case
    /// chunking, and return the state.
    fn scan_bytewise(input: &[u8], comma_separates: bool) -> ScanState {
        let mut state = ScanState::new(0, comma_separates);
        for len in 1..=input.len() {
            if state.step(&input[..len]) == ScanOutcome::Done {
                return state;
            }
        }
        panic!("scanner never finished on {:?}", String::from_utf8_lossy(input));
    }

    fn values(state: &ScanState, input: &[u8]) -> Vec<String> {
        state
            .values()
            .iter()
            .map(|v| String::from_utf8(v.materialize_from(input)).unwrap())
            .collect()
    }

    #[test]
    fn test_single_value() {
        let input = b"hello world\r\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(values(&state, input), ["hello world"]);
        // Position sits on the fold-decision byte, not past it.
        assert_eq!(state.position(), input.len() - 1);
    }

    #[test]
    fn test_comma_separates_values() {
        let input = b"1, 2\r\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(values(&state, input), ["1", "2"]);
    }

    #[test]
    fn test_comma_kept_for_exception_class() {
        let input = b"BYE, INVITE, ACK\r\nX";
        let state = scan_bytewise(input, false);
        assert_eq!(values(&state, input), ["BYE, INVITE, ACK"]);
    }

    #[test]
    fn test_comma_inside_quotes_is_data() {
        let input = b"\"Smith, John\" <sip:j@x>, <sip:k@y>\r\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(
            values(&state, input),
            ["\"Smith, John\" <sip:j@x>", "<sip:k@y>"]
        );
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let input = b"\"a\\\",b\",c\r\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(values(&state, input), ["\"a\\\",b\"", "c"]);
    }

    #[test]
    fn test_folded_value() {
        let input = b"line1\r\n line2\r\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(values(&state, input), ["line1 line2"]);
    }

    #[test]
    fn test_fold_with_tab_and_extra_wsp() {
        let input = b"first\r\n\t  second\r\nX";
        let state = scan_bytewise(input, false);
        assert_eq!(values(&state, input), ["first second"]);
    }

    #[test]
    fn test_value_that_starts_at_a_fold() {
        // The whole value sits on the continuation line.
        let input = b"\r\n late\r\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(values(&state, input), ["late"]);
    }

    #[test]
    fn test_bare_lf_line_end() {
        let input = b"value\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(values(&state, input), ["value"]);
    }

    #[test]
    fn test_lone_cr_is_data() {
        let input = b"be\rep\r\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(values(&state, input), ["be\rep"]);
    }

    #[test]
    fn test_empty_value() {
        let input = b"\r\nX";
        let state = scan_bytewise(input, true);
        assert_eq!(values(&state, input), [""]);
    }

    #[test]
    fn test_needs_decision_byte_after_terminator() {
        let mut state = ScanState::new(0, true);
        assert_eq!(state.step(b"v\r\n"), ScanOutcome::NeedMore);
        // The CRLF alone cannot finish the header; the next byte decides.
        assert_eq!(state.step(b"v\r\n "), ScanOutcome::NeedMore);
        assert_eq!(state.step(b"v\r\n more\r\nX"), ScanOutcome::Done);
        assert_eq!(
            values(&state, b"v\r\n more\r\nX"),
            ["v more"]
        );
    }

    #[test]
    fn test_unfold_lws() {
        assert_eq!(unfold_lws(b"a\r\n b"), b"a b");
        assert_eq!(unfold_lws(b"a \r\n  b"), b"a b");
        assert_eq!(unfold_lws(b"a\n\tb"), b"a b");
        assert_eq!(unfold_lws(b"plain"), b"plain");
    }
}
