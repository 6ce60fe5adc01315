// Bounded history of past error samples
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use alloc::vec::Vec;

use num_traits::Float;

/// A fixed-capacity ring buffer of past error samples.
///
/// Storage for `capacity` samples is allocated once at construction; pushing past capacity
/// overwrites the oldest sample instead of growing.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorWindow<F: Float> {
    slots: Vec<F>,
    // Index of the slot the next push writes to
    cursor: usize,
    len: usize,
}

impl<F: Float> ErrorWindow<F> {
    /// Creates an empty window that holds at most `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: alloc::vec![F::zero(); capacity],
            cursor: 0,
            len: 0,
        }
    }

    /// Appends a sample, discarding the oldest one if the window is full.
    pub fn push(&mut self, value: F) {
        let capacity = self.slots.len();
        if capacity == 0 {
            return;
        }
        self.slots[self.cursor] = value;
        self.cursor = (self.cursor + 1) % capacity;
        self.len = (self.len + 1).min(capacity);
    }

    /// Returns the sample `k` positions before the most recent one, so `k = 0` is the most recent
    /// sample and `k = len() - 1` the oldest.
    ///
    /// Returns `None` if fewer than `k + 1` samples are held.
    pub fn sample_from_end(&self, k: usize) -> Option<F> {
        if k >= self.len {
            return None;
        }
        let capacity = self.slots.len();
        let index = (self.cursor + capacity - 1 - k) % capacity;
        Some(self.slots[index])
    }

    /// Returns the oldest sample held, if any.
    pub fn oldest(&self) -> Option<F> {
        self.len.checked_sub(1).and_then(|k| self.sample_from_end(k))
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no sample has been pushed since creation or the last `clear`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of samples the window holds.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns true once the window holds `capacity` samples.
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Forgets every sample. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.len = 0;
    }

    /// Iterates over the held samples from oldest to most recent.
    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        (0..self.len).rev().filter_map(move |k| self.sample_from_end(k))
    }
}
