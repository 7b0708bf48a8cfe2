//! Growable, pool-backed text accumulator used by every formatting call.
//!
//! A [`ValueSequenceBuilder`] starts over a caller supplied buffer, usually a stack array, so
//! small results never touch the heap. When that buffer is exhausted it rents a buffer of at
//! least double the size from a [`BufferPool`], copies what was written so far and hands any
//! previously rented buffer back. Dropping the builder returns its rented buffer, so every exit
//! path (including `?` propagation and panics) releases it exactly once.
//!
//! ```rust
//! use text_transform::{BufferPool, ValueSequenceBuilder};
//!
//! let pool = BufferPool::new(4);
//! let mut initial = [0u8; 8];
//! {
//!     let mut builder = ValueSequenceBuilder::with_pool(&mut initial, &pool);
//!     builder.append("a fairly long piece of text");
//!     assert_eq!(builder.as_str(), "a fairly long piece of text");
//!     assert!(builder.is_rented());
//! }
//! assert_eq!(pool.retained(), 1);
//! ```

use parking_lot::Mutex;
use std::fmt;
use std::sync::OnceLock;

/// Size of the stack buffers the crate uses for top-level and element formatting.
pub const STACK_CAPACITY: usize = 64;

const MIN_RENTED_CAPACITY: usize = 128;
const DEFAULT_RETAINED: usize = 32;
// Buffers larger than this are dropped instead of retained.
const MAX_RETAINED_CAPACITY: usize = 1 << 20;

/// Thread-safe pool of byte buffers shared by formatting calls.
#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    max_retained: usize,
}

impl BufferPool {
    /// Creates a pool that keeps at most `max_retained` idle buffers.
    #[must_use]
    pub fn new(max_retained: usize) -> Self {
        BufferPool {
            buffers: Mutex::new(Vec::new()),
            max_retained,
        }
    }

    /// The process-wide pool used by [`ValueSequenceBuilder::new`].
    pub fn shared() -> &'static BufferPool {
        static SHARED: OnceLock<BufferPool> = OnceLock::new();
        SHARED.get_or_init(|| BufferPool::new(DEFAULT_RETAINED))
    }

    /// Rents an empty buffer with at least `min_capacity` bytes of capacity.
    pub fn rent(&self, min_capacity: usize) -> Vec<u8> {
        let mut buffers = self.buffers.lock();
        if let Some(index) = buffers.iter().position(|b| b.capacity() >= min_capacity) {
            return buffers.swap_remove(index);
        }
        drop(buffers);
        Vec::with_capacity(min_capacity.next_power_of_two())
    }

    /// Returns a buffer to the pool.
    pub fn give_back(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buffer.clear();
        let mut buffers = self.buffers.lock();
        if buffers.len() < self.max_retained {
            buffers.push(buffer);
        }
    }

    /// Number of idle buffers currently held.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.buffers.lock().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        BufferPool::new(DEFAULT_RETAINED)
    }
}

/// Call-scoped text accumulator. See the [module documentation](self).
pub struct ValueSequenceBuilder<'a> {
    initial: &'a mut [u8],
    rented: Option<Vec<u8>>,
    len: usize,
    pool: &'a BufferPool,
}

impl<'a> ValueSequenceBuilder<'a> {
    /// Creates a builder over `initial` that grows through [`BufferPool::shared`].
    pub fn new(initial: &'a mut [u8]) -> Self {
        Self::with_pool(initial, BufferPool::shared())
    }

    pub fn with_pool(initial: &'a mut [u8], pool: &'a BufferPool) -> Self {
        ValueSequenceBuilder {
            initial,
            rented: None,
            len: 0,
            pool,
        }
    }

    /// The pool this builder grows through.
    pub fn pool(&self) -> &'a BufferPool {
        self.pool
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes available before the next growth.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.rented {
            Some(buffer) => buffer.capacity(),
            None => self.initial.len(),
        }
    }

    /// Whether the content has moved into a pooled buffer.
    #[must_use]
    pub fn is_rented(&self) -> bool {
        self.rented.is_some()
    }

    pub fn append(&mut self, text: &str) {
        self.append_bytes(text.as_bytes());
    }

    pub fn push(&mut self, ch: char) {
        let mut encoded = [0u8; 4];
        self.append(ch.encode_utf8(&mut encoded));
    }

    fn append_bytes(&mut self, bytes: &[u8]) {
        let required = self.len + bytes.len();
        if required > self.capacity() {
            self.grow(required);
        }
        match self.rented.as_mut() {
            Some(buffer) => buffer.extend_from_slice(bytes),
            None => self.initial[self.len..required].copy_from_slice(bytes),
        }
        self.len = required;
    }

    fn grow(&mut self, required: usize) {
        let target = self
            .capacity()
            .saturating_mul(2)
            .max(required)
            .max(MIN_RENTED_CAPACITY);
        let mut next = self.pool.rent(target);
        next.extend_from_slice(self.written());
        tracing::trace!(from = self.capacity(), to = next.capacity(), "value sequence builder grew");
        if let Some(previous) = self.rented.replace(next) {
            self.pool.give_back(previous);
        }
    }

    fn written(&self) -> &[u8] {
        match &self.rented {
            Some(buffer) => buffer,
            None => &self.initial[..self.len],
        }
    }

    /// The text written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // only whole UTF-8 sequences are ever appended and removed
        std::str::from_utf8(self.written()).unwrap_or_default()
    }

    #[must_use]
    pub fn ends_with(&self, ch: char) -> bool {
        let mut encoded = [0u8; 4];
        self.written().ends_with(ch.encode_utf8(&mut encoded).as_bytes())
    }

    /// Removes and returns the last character.
    pub fn pop(&mut self) -> Option<char> {
        let bytes = self.written();
        // a UTF-8 sequence is at most 4 bytes; skip back over continuation bytes
        let start = (bytes.len().saturating_sub(4)..bytes.len())
            .rev()
            .find(|&i| bytes[i] & 0xC0 != 0x80)?;
        let last = std::str::from_utf8(&bytes[start..]).ok()?.chars().next()?;
        self.len = start;
        if let Some(buffer) = self.rented.as_mut() {
            buffer.truncate(self.len);
        }
        Some(last)
    }

    /// Forgets the content but keeps the current buffer.
    pub fn clear(&mut self) {
        self.len = 0;
        if let Some(buffer) = self.rented.as_mut() {
            buffer.clear();
        }
    }

    /// Returns the rented buffer (if any) to the pool and resets to empty.
    ///
    /// Called by `Drop`; calling it earlier is harmless.
    pub fn dispose(&mut self) {
        if let Some(buffer) = self.rented.take() {
            self.pool.give_back(buffer);
        }
        self.len = 0;
    }
}

impl Drop for ValueSequenceBuilder<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Write for ValueSequenceBuilder<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.push(c);
        Ok(())
    }
}

impl fmt::Display for ValueSequenceBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ValueSequenceBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSequenceBuilder")
            .field("text", &self.as_str())
            .field("capacity", &self.capacity())
            .field("rented", &self.is_rented())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_small_content_stays_in_initial_buffer() {
        let pool = BufferPool::new(4);
        let mut initial = [0u8; 16];
        let mut builder = ValueSequenceBuilder::with_pool(&mut initial, &pool);
        builder.append("abc");
        builder.push('∅');
        assert_eq!(builder.as_str(), "abc∅");
        assert!(!builder.is_rented());
        assert_eq!(builder.capacity(), 16);
    }

    #[test]
    fn test_growth_doubles_and_recycles() {
        let pool = BufferPool::new(4);
        let mut initial = [0u8; 4];
        let mut builder = ValueSequenceBuilder::with_pool(&mut initial, &pool);
        builder.append("0123");
        assert!(!builder.is_rented());
        builder.append("4");
        assert!(builder.is_rented());
        let first = builder.capacity();
        assert!(first >= 8);

        let long = "x".repeat(first);
        builder.append(&long);
        assert!(builder.capacity() >= first * 2);
        // the first rented buffer went back while growing
        assert_eq!(pool.retained(), 1);
        assert_eq!(builder.len(), 5 + first);
        assert!(builder.as_str().starts_with("01234x"));

        drop(builder);
        assert_eq!(pool.retained(), 2);
    }

    #[test]
    fn test_dispose_releases_once() {
        let pool = BufferPool::new(4);
        let mut initial = [0u8; 2];
        let mut builder = ValueSequenceBuilder::with_pool(&mut initial, &pool);
        builder.append("long enough");
        builder.dispose();
        assert!(builder.is_empty());
        assert_eq!(pool.retained(), 1);
        builder.dispose();
        drop(builder);
        assert_eq!(pool.retained(), 1);
    }

    #[test]
    fn test_pop_handles_multibyte() {
        let mut initial = [0u8; 16];
        let mut builder = ValueSequenceBuilder::new(&mut initial);
        builder.append("a;∅");
        assert!(builder.ends_with('∅'));
        assert_eq!(builder.pop(), Some('∅'));
        assert_eq!(builder.pop(), Some(';'));
        assert_eq!(builder.as_str(), "a");
    }

    #[test]
    fn test_tail_checks_after_growth() {
        let pool = BufferPool::new(4);
        let mut initial = [0u8; 4];
        let mut builder = ValueSequenceBuilder::with_pool(&mut initial, &pool);
        builder.push('€');
        assert!(builder.ends_with('€'));
        assert!(!builder.ends_with('¬'));
        builder.append("∅;∅");
        assert!(builder.is_rented());
        assert!(builder.ends_with('∅'));
        assert!(!builder.ends_with(';'));
        assert_eq!(builder.pop(), Some('∅'));
        assert!(builder.ends_with(';'));
        assert_eq!(builder.pop(), Some(';'));
        assert_eq!(builder.pop(), Some('∅'));
        assert_eq!(builder.pop(), Some('€'));
        assert_eq!(builder.pop(), None);
        assert!(builder.is_empty());
        assert!(!builder.ends_with('€'));
        builder.push('x');
        assert_eq!(builder.as_str(), "x");
    }

    #[test]
    fn test_write_macro() {
        let mut initial = [0u8; 4];
        let mut builder = ValueSequenceBuilder::new(&mut initial);
        write!(builder, "{}-{}", 12345, 6.5).unwrap();
        assert_eq!(builder.to_string(), "12345-6.5");
    }

    #[test]
    fn test_pool_reuses_large_enough_buffers() {
        let pool = BufferPool::new(2);
        let buffer = pool.rent(100);
        let capacity = buffer.capacity();
        pool.give_back(buffer);
        let again = pool.rent(50);
        assert_eq!(again.capacity(), capacity);
        assert_eq!(pool.retained(), 0);
    }
}
