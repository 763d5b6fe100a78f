//! Fixed-capacity sliding window
//!
//! Keeps the `capacity` most recently pushed elements in insertion order and
//! evicts the oldest element when a push would overflow.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one element, evicting the oldest first when full
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Push every element of `items` individually, in order
    ///
    /// When more than `capacity` elements are pushed only the last
    /// `capacity` of them survive.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.push(item);
        }
    }

    /// Current contents, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity_keeps_order() {
        let mut buffer = RingBuffer::new(4);
        buffer.push(1);
        buffer.push(2);
        assert_eq!(buffer.snapshot(), vec![1, 2]);
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut buffer = RingBuffer::new(3);
        for i in 0..5 {
            buffer.push(i);
        }
        assert_eq!(buffer.snapshot(), vec![2, 3, 4]);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_bulk_push_longer_than_capacity() {
        let mut buffer = RingBuffer::new(3);
        buffer.push(-1);
        buffer.extend(vec![10, 11, 12, 13, 14]);
        assert_eq!(buffer.snapshot(), vec![12, 13, 14]);
    }

    #[test]
    fn test_zero_capacity_is_always_empty() {
        let mut buffer = RingBuffer::new(0);
        buffer.push("a");
        buffer.extend(["b", "c"]);
        assert!(buffer.snapshot().is_empty());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut buffer = RingBuffer::new(2);
        buffer.extend([1, 2]);
        let first = buffer.snapshot();
        let second = buffer.snapshot();
        assert_eq!(first, second);
        assert_eq!(buffer.len(), 2);
    }
}
