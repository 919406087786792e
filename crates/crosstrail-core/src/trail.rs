//! Bounded per-participant position history.

use std::collections::VecDeque;

use fnv::FnvHashMap;
use glam::Vec2;

use crate::constants::MAX_TRAIL_LENGTH;
use crate::protocol::ParticipantId;

/// FIFO of the most recent positions, oldest first.
#[derive(Clone, Debug)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends in arrival order, evicting from the front once full.
    pub fn push(&mut self, p: Vec2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(p);
    }

    #[inline]
    pub fn last(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    /// Consecutive point pairs, oldest segment first.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.iter().zip(self.points.iter().skip(1)).map(|(a, b)| (*a, *b))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::with_capacity(MAX_TRAIL_LENGTH)
    }
}

/// Trails for every participant this endpoint knows about.
///
/// Each endpoint rebuilds its own copies from the positions it observes;
/// nothing here is shared across endpoints.
#[derive(Clone, Debug)]
pub struct TrailStore {
    trails: FnvHashMap<ParticipantId, Trail>,
    capacity: usize,
}

impl TrailStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            trails: FnvHashMap::default(),
            capacity,
        }
    }

    /// Appends to `id`'s trail, creating it on first use.
    pub fn append(&mut self, id: &ParticipantId, p: Vec2) {
        let capacity = self.capacity;
        self.trails
            .entry(id.clone())
            .or_insert_with(|| Trail::with_capacity(capacity))
            .push(p);
    }

    /// Replaces `id`'s trail with an empty one.
    pub fn reset(&mut self, id: &ParticipantId) {
        self.trails
            .insert(id.clone(), Trail::with_capacity(self.capacity));
    }

    pub fn remove(&mut self, id: &ParticipantId) -> Option<Trail> {
        self.trails.remove(id)
    }

    pub fn clear(&mut self) {
        self.trails.clear();
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Trail> {
        self.trails.get(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.trails.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &Trail)> {
        self.trails.iter()
    }
}

impl Default for TrailStore {
    fn default() -> Self {
        Self::new(MAX_TRAIL_LENGTH)
    }
}
