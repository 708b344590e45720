//! VM Stack Implementation
//!
//! Unbounded LIFO of raw code units shared by `push`/`pop` and `call`/`ret`.
//! No execution semantics; the engine decides what an empty pop means.

/// VM execution stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    values: Vec<u16>,
}

impl Stack {
    pub fn new() -> Self {
        Stack { values: Vec::new() }
    }

    /// Stack holding `values`, bottom first
    pub fn from_values(values: Vec<u16>) -> Self {
        Stack { values }
    }

    pub fn push(&mut self, value: u16) {
        self.values.push(value);
    }

    /// Pop the top value, `None` when empty
    pub fn pop(&mut self) -> Option<u16> {
        self.values.pop()
    }

    pub fn peek(&self) -> Option<u16> {
        self.values.last().copied()
    }

    /// Get current stack depth
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Contents from bottom to top
    pub fn as_slice(&self) -> &[u16] {
        &self.values
    }
}
