//! Host recognition for `sent-by` and parameter values
//!
//! The grammar is ambiguous between `hostname` and dotted-decimal IPv4
//! without unbounded look-ahead (`1.2.3.4` and `a.example.com` share a long
//! prefix shape), so two small automata run in parallel over the same bytes
//! and whichever is in an accepting state at the terminator wins. A greedy
//! single-pass scan cannot backtrack between the two interpretations.
//!
//! IPv6 literals are a separate case: a leading `[` must be matched by a `]`
//! before any terminator.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{Error, Result};
use crate::types::Host;

/// Bytes that end a host in the contexts this crate parses hosts in
/// (sent-by and parameter values): `:` (port), `;` (params), `,` (next
/// value), `>` (end of name-addr), whitespace, line end.
fn is_host_terminator(b: u8) -> bool {
    matches!(b, b':' | b';' | b',' | b'>' | b' ' | b'\t' | b'\r' | b'\n')
}

/// Hostname automaton: dot-separated labels of `alphanum | -`, no label
/// starting or ending with a hyphen, and the final (top-level) label
/// starting with a letter.
#[derive(Debug)]
struct HostnameFsm {
    alive: bool,
    label_len: usize,
    label_starts_alpha: bool,
    last_was_hyphen: bool,
    /// A previous label already qualified as a top label and was followed by
    /// a dot; keeps a trailing-dot hostname accepting.
    dotted_top: bool,
}

impl HostnameFsm {
    fn new() -> Self {
        Self {
            alive: true,
            label_len: 0,
            label_starts_alpha: false,
            last_was_hyphen: false,
            dotted_top: false,
        }
    }

    fn feed(&mut self, b: u8) {
        if !self.alive {
            return;
        }
        match b {
            b'.' => {
                if self.label_len == 0 || self.last_was_hyphen {
                    self.alive = false;
                } else {
                    self.dotted_top = self.label_starts_alpha;
                    self.label_len = 0;
                    self.last_was_hyphen = false;
                }
            }
            b'-' => {
                if self.label_len == 0 {
                    self.alive = false;
                } else {
                    self.label_len += 1;
                    self.last_was_hyphen = true;
                }
            }
            c if c.is_ascii_alphanumeric() => {
                if self.label_len == 0 {
                    self.label_starts_alpha = c.is_ascii_alphabetic();
                }
                self.label_len += 1;
                self.last_was_hyphen = false;
            }
            _ => self.alive = false,
        }
    }

    fn accepting(&self) -> bool {
        if !self.alive {
            return false;
        }
        if self.label_len > 0 {
            self.label_starts_alpha && !self.last_was_hyphen
        } else {
            // Trailing dot after a valid top label.
            self.dotted_top
        }
    }
}

/// IPv4 automaton: exactly four groups of 1–3 digits, each 0–255.
#[derive(Debug)]
struct Ipv4Fsm {
    alive: bool,
    groups_done: u8,
    group_digits: u8,
    group_value: u16,
}

impl Ipv4Fsm {
    fn new() -> Self {
        Self {
            alive: true,
            groups_done: 0,
            group_digits: 0,
            group_value: 0,
        }
    }

    fn feed(&mut self, b: u8) {
        if !self.alive {
            return;
        }
        match b {
            b'0'..=b'9' => {
                self.group_digits += 1;
                self.group_value = self.group_value * 10 + u16::from(b - b'0');
                if self.group_digits > 3 || self.group_value > 255 {
                    self.alive = false;
                }
            }
            b'.' => {
                if self.group_digits == 0 || self.groups_done >= 3 {
                    self.alive = false;
                } else {
                    self.groups_done += 1;
                    self.group_digits = 0;
                    self.group_value = 0;
                }
            }
            _ => self.alive = false,
        }
    }

    fn accepting(&self) -> bool {
        self.alive && self.groups_done == 3 && self.group_digits > 0
    }
}

/// Recognize a host at the start of `input`.
///
/// Returns the parsed host and the number of bytes consumed. `base` is the
/// absolute offset of `input[0]`, used to tag grammar errors.
pub fn scan_host(input: &[u8], base: usize) -> Result<(Host, usize)> {
    if input.first() == Some(&b'[') {
        return scan_ipv6(input, base);
    }

    let mut hostname = HostnameFsm::new();
    let mut ipv4 = Ipv4Fsm::new();
    let mut len = 0;
    while len < input.len() && !is_host_terminator(input[len]) {
        hostname.feed(input[len]);
        ipv4.feed(input[len]);
        len += 1;
    }

    if len == 0 {
        return Err(Error::malformed(base, "host"));
    }
    // IPv4 first: a dotted-decimal address is never a valid hostname (its
    // top label starts with a digit), so the automata cannot both accept.
    if ipv4.accepting() {
        let text = std::str::from_utf8(&input[..len])
            .map_err(|_| Error::malformed(base, "host"))?;
        let addr: Ipv4Addr = text.parse().map_err(|_| Error::malformed(base, "host"))?;
        Ok((Host::Ipv4(addr), len))
    } else if hostname.accepting() {
        let text = std::str::from_utf8(&input[..len])
            .map_err(|_| Error::malformed(base, "host"))?;
        Ok((Host::Domain(text.to_string()), len))
    } else {
        Err(Error::malformed(base, "host"))
    }
}

fn scan_ipv6(input: &[u8], base: usize) -> Result<(Host, usize)> {
    // input[0] is '['; the literal must close before any terminator.
    for (i, &b) in input.iter().enumerate().skip(1) {
        if b == b']' {
            let text = std::str::from_utf8(&input[1..i])
                .map_err(|_| Error::malformed(base + 1, "IPv6 address"))?;
            let addr: Ipv6Addr = text
                .parse()
                .map_err(|_| Error::malformed(base + 1, "IPv6 address"))?;
            return Ok((Host::Ipv6(addr), i + 1));
        }
        if is_host_terminator(b) && b != b':' {
            return Err(Error::malformed(base + i, "']'"));
        }
    }
    Err(Error::malformed(base + input.len(), "']'"))
}
