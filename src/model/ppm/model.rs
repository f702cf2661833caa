//! PPM model state machine: context window, context selection and the
//! escape/exclusion cascade.

use tracing::debug;

use super::node::{NodeId, Trie};
use super::MIN_CONTEXT_LENGTH;
use crate::model::{
    ArithCodeModel, ByteBuffer, ByteSet, ExcludingAdaptiveUnigramModel, Interval, Symbol,
};

/// Adaptive PPM model of a fixed maximum order.
///
/// The encoder and decoder each own one instance built with the same order;
/// as long as both are driven through the same calls they stay in lock-step.
///
/// # Example
///
/// ```
/// use arithcode::{compress, decompress, PpmModel};
///
/// let text = b"how much wood would a woodchuck chuck";
/// let packed = compress(text, PpmModel::new(4)).unwrap();
/// let unpacked = decompress(&packed, PpmModel::new(4)).unwrap();
/// assert_eq!(unpacked, text);
/// ```
#[derive(Clone)]
pub struct PpmModel {
    max_context_length: usize,
    /// Last `max_context_length + 1` bytes
    buffer: ByteBuffer,
    trie: Trie,
    backoff: ExcludingAdaptiveUnigramModel,
    context_length: usize,
    /// `None` means the backoff model is active
    context_node: Option<NodeId>,
    excluded: ByteSet,
}

impl PpmModel {
    /// Create a model consulting contexts of up to `max_context_length`
    /// bytes. Order 0 uses only the order-0 backoff model.
    pub fn new(max_context_length: usize) -> Self {
        let buffer = ByteBuffer::new(max_context_length + 1);
        debug!(
            order = max_context_length,
            buffer_width = buffer.max_width(),
            "created PPM model"
        );
        Self {
            max_context_length,
            buffer,
            trie: Trie::new(),
            backoff: ExcludingAdaptiveUnigramModel::new(),
            context_length: 0,
            context_node: None,
            excluded: ByteSet::new(),
        }
    }

    /// Maximum context length (the model's order).
    pub fn max_context_length(&self) -> usize {
        self.max_context_length
    }

    /// Length of the active context; 0 when the backoff model is active.
    pub fn context_length(&self) -> usize {
        self.context_length
    }

    /// Bytes currently excluded by the escape cascade.
    pub fn excluded(&self) -> &ByteSet {
        &self.excluded
    }

    /// Number of trie nodes in use.
    pub fn node_count(&self) -> usize {
        self.trie.live_nodes()
    }

    /// Exclude every byte in `bytes` until the next symbol is coded.
    pub fn exclude_all(&mut self, bytes: &ByteSet) {
        self.excluded.add_all(bytes);
    }

    /// Trie node for the last `length` bytes of the window.
    fn lookup_node(&self, length: usize) -> Option<NodeId> {
        let window = self.buffer.window();
        let start = window.len() - length;
        let root = self.trie.root(window[start])?;
        self.trie.lookup(root, &window[start + 1..])
    }

    fn usable(&self, node: Option<NodeId>) -> Option<NodeId> {
        node.filter(|&n| !self.trie.is_childless(n, &self.excluded))
    }

    /// Pick the shortest deterministic context, else the longest usable one,
    /// among lengths `MIN_CONTEXT_LENGTH..=context_length`.
    fn select_context_binary_search(&mut self) {
        let mut low = MIN_CONTEXT_LENGTH;
        let mut high = self.context_length;
        self.context_length = MIN_CONTEXT_LENGTH - 1;
        self.context_node = None;
        let mut found_deterministic = false;
        while high >= low {
            let length = (high + low) / 2;
            let Some(node) = self.usable(self.lookup_node(length)) else {
                high = if length < high { length } else { high - 1 };
                continue;
            };
            if self.trie.is_deterministic(node, &self.excluded) {
                self.context_length = length;
                self.context_node = Some(node);
                found_deterministic = true;
                high = if length < high { length } else { high - 1 };
            } else {
                if !found_deterministic {
                    self.context_length = length;
                    self.context_node = Some(node);
                }
                low = if length > low { length } else { low + 1 };
            }
        }
    }

    /// After an escape: step down to the next usable context, then keep
    /// shortening while the shorter context is deterministic too.
    fn select_context_long_to_short(&mut self) {
        while self.context_length >= MIN_CONTEXT_LENGTH {
            let Some(mut node) = self.usable(self.lookup_node(self.context_length)) else {
                self.context_length -= 1;
                continue;
            };
            while self.context_length > MIN_CONTEXT_LENGTH
                && self.trie.is_deterministic(node, &self.excluded)
            {
                match self.lookup_node(self.context_length - 1) {
                    Some(shorter) if self.trie.is_deterministic(shorter, &self.excluded) => {
                        node = shorter;
                        self.context_length -= 1;
                    }
                    _ => break,
                }
            }
            self.context_node = Some(node);
            return;
        }
        self.context_node = None;
    }

    fn interval_escape(&mut self) -> Interval {
        let Some(node) = self.context_node else {
            unreachable!("escape coded with no active PPM context");
        };
        let interval = self.trie.interval_escape(node, &self.excluded);
        if self.context_length >= MIN_CONTEXT_LENGTH {
            for child in self.trie.children(node) {
                self.excluded.add(self.trie.byte(child));
            }
        }
        self.context_length -= 1;
        self.select_context_long_to_short();
        interval
    }

    fn interval_byte(&mut self, byte: u8) -> Interval {
        let interval = match self.context_node {
            Some(node) => self
                .trie
                .interval(node, byte, &self.excluded)
                .unwrap_or_else(|| {
                    panic!("byte {byte:#04x} coded in a context that must escape first")
                }),
            None => self.backoff.interval(Symbol::Byte(byte), &self.excluded),
        };
        self.increment(byte);
        interval
    }
}

impl ArithCodeModel for PpmModel {
    #[inline]
    fn total_count(&self) -> u32 {
        match self.context_node {
            Some(node) => self.trie.total_count(node, &self.excluded),
            None => self.backoff.total_count(&self.excluded),
        }
    }

    #[inline]
    fn point_to_symbol(&self, count: u32) -> Symbol {
        match self.context_node {
            Some(node) => self.trie.point_to_symbol(node, count, &self.excluded),
            None => self.backoff.point_to_symbol(count, &self.excluded),
        }
    }

    /// # Panics
    ///
    /// Panics if an escape is requested with no active context, or a byte
    /// is requested that the active context cannot code. Neither happens
    /// when [`escaped`](ArithCodeModel::escaped) is honored.
    fn interval(&mut self, symbol: Symbol) -> Interval {
        match symbol {
            Symbol::Eof => self.backoff.interval(Symbol::Eof, &self.excluded),
            Symbol::Escape => self.interval_escape(),
            Symbol::Byte(byte) => self.interval_byte(byte),
        }
    }

    #[inline]
    fn escaped(&self, symbol: Symbol) -> bool {
        let Some(node) = self.context_node else {
            return false;
        };
        match symbol {
            Symbol::Eof => true,
            Symbol::Byte(byte) => !self.trie.has_daughter(node, byte),
            Symbol::Escape => false,
        }
    }

    fn exclude(&mut self, byte: u8) {
        self.excluded.add(byte);
    }

    /// Push `byte` into the window, count the new contexts and select the
    /// next one. Clears the exclusions.
    fn increment(&mut self, byte: u8) {
        self.buffer.push(byte);
        let window = self.buffer.window();
        let root = self.trie.root_or_insert(window[0]);
        if window.len() > 1 {
            self.trie.increment(root, &window[1..]);
        }
        self.context_length = self.max_context_length.min(window.len());
        self.select_context_binary_search();
        self.excluded.clear();
    }
}

impl std::fmt::Debug for PpmModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PpmModel")
            .field("max_context_length", &self.max_context_length)
            .field("context_length", &self.context_length)
            .field("nodes", &self.trie.live_nodes())
            .field("excluded", &self.excluded)
            .finish()
    }
}
