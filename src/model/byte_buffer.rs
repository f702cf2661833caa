//! Sliding window over the most recent bytes.

/// Over-allocation factor; the window is compacted once per
/// `(BUFFER_SIZE_MULTIPLIER - 1) * max_width` pushes.
const BUFFER_SIZE_MULTIPLIER: usize = 32;

/// Bounded FIFO holding the last `max_width` bytes seen.
///
/// Backing storage is over-allocated so that sliding the window is usually
/// just an offset bump; the live bytes are shifted to the front only when
/// the storage runs out. Reads never copy.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    max_width: usize,
    offset: usize,
    length: usize,
}

impl ByteBuffer {
    /// Create a buffer holding at most `max_width` bytes (at least one).
    pub fn new(max_width: usize) -> Self {
        let max_width = max_width.max(1);
        Self {
            bytes: vec![0; BUFFER_SIZE_MULTIPLIER * max_width],
            max_width,
            offset: 0,
            length: 0,
        }
    }

    /// Append `byte`, dropping the oldest byte once the window is full.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        if self.offset + self.length == self.bytes.len() {
            self.compact();
        }
        self.bytes[self.offset + self.length] = byte;
        if self.length < self.max_width {
            self.length += 1;
        } else {
            self.offset += 1;
        }
    }

    /// Move the live bytes, minus the one about to be dropped, to the front.
    fn compact(&mut self) {
        let keep = self.length.saturating_sub(1);
        self.bytes
            .copy_within(self.offset + self.length - keep..self.offset + self.length, 0);
        self.offset = 0;
        self.length = keep;
    }

    /// Backing storage; the window is `bytes()[offset()..offset() + len()]`.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Index of the oldest buffered byte in [`bytes`](Self::bytes).
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether nothing has been buffered yet.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Maximum number of bytes held.
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// The buffered bytes, oldest first.
    #[inline]
    pub fn window(&self) -> &[u8] {
        &self.bytes[self.offset..self.offset + self.length]
    }
}
