//! SIP grammar and framing
//!
//! The lexical rules (`separators`, `token`) are parsers over raw byte
//! slices; `grammar` lifts them onto a [`ByteCursor`] with
//! `consume_*`/`expect_*` flavors; `scanner` turns the bytes after HCOLON
//! into logical header values; `batch` and `stream` frame whole messages.
//!
//! [`ByteCursor`]: crate::buffer::ByteCursor

pub mod address;
pub mod batch;
pub mod grammar;
pub mod host;
pub mod scanner;
pub mod separators;
pub mod stream;
pub mod token;
pub mod values;
pub mod via;

pub use batch::{frame, frame_with_config};
pub use stream::StreamingFramer;
