use std::collections::VecDeque;
use std::fmt;

/// Fixed capacity queue that evicts the oldest item when full
pub struct CircularQueue<T> {
    deque: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> Clone for CircularQueue<T> {
    fn clone(&self) -> Self {
        Self {
            deque: self.deque.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.deque.fmt(f)
    }
}

impl<T> CircularQueue<T> {
    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            deque: VecDeque::with_capacity(cap),
            capacity: cap,
        }
    }

    /// Pushes the newest item, returning the evicted oldest one if the queue was full.
    #[inline]
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }

        let evicted = if self.is_full() {
            self.deque.pop_front()
        } else {
            None
        };

        self.deque.push_back(item);

        evicted
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.deque.len() == self.capacity
    }

    /// Oldest item first, leaving the queue empty.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.deque.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut q = CircularQueue::with_capacity(2);

        assert_eq!(q.push(1), None);
        assert_eq!(q.push(2), None);
        assert!(q.is_full());
        assert_eq!(q.push(3), Some(1));
        assert_eq!(q.drain().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut q = CircularQueue::with_capacity(0);

        assert_eq!(q.push(1), Some(1));
        assert!(q.drain().next().is_none());
    }

    #[test]
    fn test_drain_is_oldest_first() {
        let mut q = CircularQueue::with_capacity(3);
        q.push('a');
        q.push('b');
        q.push('c');

        assert_eq!(q.drain().collect::<String>(), "abc");
        assert!(q.drain().next().is_none());
    }
}
