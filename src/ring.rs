//! Fixed-capacity FIFO ring buffer that overwrites its oldest entry when full.

use std::collections::VecDeque;

use crate::error::{AlgoError, Result};

#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    /// Slot the next push writes.
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(AlgoError::ZeroCapacity);
        }
        Ok(Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            head: 0,
            len: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Index of the slot the next [`RingBuffer::push`] writes.
    pub fn head_index(&self) -> usize {
        self.head
    }

    /// Appends `value`. When full, the oldest entry is evicted and returned.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = self.slots[self.head].replace(value);
        self.head = self.advance(self.head, 1);
        if self.len < self.capacity() {
            self.len += 1;
        }
        evicted
    }

    /// Removes and returns the oldest entry.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let tail = self.tail();
        self.len -= 1;
        self.slots[tail].take()
    }

    /// The oldest entry, without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.tail()].as_ref()
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let tail = self.tail();
        (0..self.len).filter_map(move |i| self.slots[self.advance(tail, i)].as_ref())
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
    }

    /// Drains the buffer oldest-first into a deque.
    pub fn drain_to_deque(&mut self) -> VecDeque<T> {
        std::iter::from_fn(|| self.pop()).collect()
    }

    fn tail(&self) -> usize {
        (self.head + self.capacity() - self.len) % self.capacity()
    }

    fn advance(&self, index: usize, by: usize) -> usize {
        (index + by) % self.capacity()
    }
}
