//! Framer configuration
//!
//! All limits exist to bound the work an unauthenticated peer can force on
//! the parser. The defaults match common SIP deployments; override them per
//! framer instance when a deployment carries unusually large messages.

/// Size limits recognized by the batch and streaming framers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramerConfig {
    /// Largest accepted request/status line, in bytes.
    pub max_initial_line_size: usize,
    /// Largest accepted header section (everything between the initial line
    /// and the blank line), in bytes.
    pub max_headers_size: usize,
    /// Largest accepted Content-Length value.
    pub max_content_length: usize,
    /// Capacity of the ring buffer behind a [`StreamCursor`], in bytes;
    /// applied by [`StreamCursor::with_config`]. Must cover the largest
    /// single read ever requested from the stream — in particular a body
    /// pull reads `Content-Length` bytes at once, so raising
    /// `max_content_length` past this capacity requires raising it too.
    ///
    /// [`StreamCursor`]: crate::buffer::StreamCursor
    /// [`StreamCursor::with_config`]: crate::buffer::StreamCursor::with_config
    pub ring_buffer_capacity: usize,
}

impl FramerConfig {
    pub const DEFAULT_MAX_INITIAL_LINE_SIZE: usize = 1024;
    pub const DEFAULT_MAX_HEADERS_SIZE: usize = 4096;
    pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 4096;
    /// Matches the snapshot length used by typical capture tooling.
    pub const DEFAULT_RING_BUFFER_CAPACITY: usize = 262_144;
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            max_initial_line_size: Self::DEFAULT_MAX_INITIAL_LINE_SIZE,
            max_headers_size: Self::DEFAULT_MAX_HEADERS_SIZE,
            max_content_length: Self::DEFAULT_MAX_CONTENT_LENGTH,
            ring_buffer_capacity: Self::DEFAULT_RING_BUFFER_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FramerConfig::default();
        assert_eq!(config.max_initial_line_size, 1024);
        assert_eq!(config.max_headers_size, 4096);
        assert_eq!(config.max_content_length, 4096);
        assert_eq!(config.ring_buffer_capacity, 262_144);
    }
}
