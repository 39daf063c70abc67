//! Message model: the typed result of framing

mod address;
mod call_id;
mod cseq;
pub mod header;
mod header_name;
mod host;
mod max_forwards;
mod message;
mod method;
mod param;
mod start_line;
mod via;

pub use address::NameAddr;
pub use call_id::CallId;
pub use cseq::CSeq;
pub use header::{HeaderSlice, SystemKind, TypedHeader};
pub use header_name::HeaderName;
pub use host::Host;
pub use max_forwards::MaxForwards;
pub use message::SipMessage;
pub use method::Method;
pub use param::Param;
pub use start_line::{RequestLine, StartLine, StatusLine};
pub use via::Via;
