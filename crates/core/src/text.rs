//! Bounded display text
//!
//! Fixed-capacity strings used for the values echoed on the telemetry
//! stream. Writes never fail: input longer than the limit is cut at the
//! last UTF-8 character boundary that fits.

use core::fmt;
use heapless::String;

/// Owned text of at most `N` bytes
#[derive(Clone, PartialEq, Eq, Default)]
pub struct BoundedText<const N: usize> {
    inner: String<N>,
}

impl<const N: usize> BoundedText<N> {
    pub const fn new() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Create from `text`, truncated to the capacity
    pub fn from_str_truncated(text: &str) -> Self {
        let mut out = Self::new();
        out.set(text);
        out
    }

    /// Replace the contents with `text`, truncated to the capacity
    pub fn set(&mut self, text: &str) {
        self.set_limited(text, N);
    }

    /// Replace the contents with at most `limit` bytes of `text`
    pub fn set_limited(&mut self, text: &str, limit: usize) {
        self.inner.clear();
        let head = truncate_at_boundary(text, limit.min(N));
        // head.len() <= N, cannot overflow
        let _ = self.inner.push_str(head);
    }

    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

/// Longest prefix of `text` of at most `max_bytes` ending on a char boundary
pub fn truncate_at_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

impl<const N: usize> fmt::Display for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> fmt::Debug for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}
