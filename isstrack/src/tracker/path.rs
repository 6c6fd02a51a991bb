//! Bounded trail of recent fixes.

use std::collections::VecDeque;

use crate::position::Position;

/// FIFO ring of the most recent positions, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalPath {
    points: VecDeque<Position>,
    max_len: usize,
}

impl OrbitalPath {
    pub fn new(max_len: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(max_len.min(1024)),
            max_len,
        }
    }

    /// Append a fix, evicting the oldest entries beyond the bound.
    pub fn push(&mut self, position: Position) {
        if self.max_len == 0 {
            return;
        }
        while self.points.len() >= self.max_len {
            self.points.pop_front();
        }
        self.points.push_back(position);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&Position> {
        self.points.back()
    }

    /// Copy of the path, oldest first.
    pub fn to_vec(&self) -> Vec<Position> {
        self.points.iter().cloned().collect()
    }
}
