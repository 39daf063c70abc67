//! Byte-buffer layer: protocol-agnostic cursors over byte storage
//!
//! [`ByteCursor`] is the borrowed zero-copy view the grammar layer parses
//! through; [`RingBuffer`] and [`StreamCursor`] adapt a blocking byte source
//! (file, socket) so the same scan operations work over a stream.

mod cursor;
mod ring;

pub use cursor::ByteCursor;
pub use ring::{RingBuffer, StreamCursor};
