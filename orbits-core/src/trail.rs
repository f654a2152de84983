use crate::vector::Vector2;
use std::collections::VecDeque;

/// Bounded, chronologically ordered history of a body's positions.
///
/// Consecutive duplicates are never stored, and once the trail holds
/// `capacity` points the oldest ones are dropped first.
#[derive(Clone, Debug)]
pub struct Trail {
    points: VecDeque<Vector2>,
    capacity: usize,
}

impl Trail {
    /// Creates an empty trail holding at most `capacity` points.
    ///
    /// ### Parameters
    /// - `capacity` - Maximum number of positions retained.
    ///
    /// ### Returns
    /// A new, empty [`Trail`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Records a new position.
    ///
    /// The point is appended only if it differs from the most recent
    /// entry. Afterwards the oldest entries are dropped until the trail
    /// fits its capacity.
    ///
    /// ### Parameters
    /// - `pos` - Position reached this tick.
    ///
    /// ### Returns
    /// `true` if the point was appended.
    pub fn record(&mut self, pos: Vector2) -> bool {
        let appended = self.points.back() != Some(&pos);
        if appended {
            self.points.push_back(pos);
        }
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        appended
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector2> + '_ {
        self.points.iter()
    }

    pub fn last(&self) -> Option<Vector2> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity, trimming the oldest points if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_duplicates_are_skipped() {
        let mut trail = Trail::with_capacity(10);

        assert!(trail.record(Vector2::new(1.0, 1.0)));
        assert!(!trail.record(Vector2::new(1.0, 1.0)));
        assert!(trail.record(Vector2::new(2.0, 1.0)));
        // Not consecutive any more, so it is kept.
        assert!(trail.record(Vector2::new(1.0, 1.0)));

        assert_eq!(trail.len(), 3);
    }

    #[test]
    fn oldest_points_are_dropped_first() {
        let mut trail = Trail::with_capacity(300);

        for i in 0..350 {
            trail.record(Vector2::new(i as f64, 0.0));
        }

        assert_eq!(trail.len(), 300);
        assert_eq!(trail.iter().next().copied(), Some(Vector2::new(50.0, 0.0)));
        assert_eq!(trail.last(), Some(Vector2::new(349.0, 0.0)));

        let xs: Vec<f64> = trail.iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn shrinking_capacity_trims_history() {
        let mut trail = Trail::with_capacity(5);
        for i in 0..5 {
            trail.record(Vector2::new(0.0, i as f64));
        }

        trail.set_capacity(2);

        assert_eq!(trail.len(), 2);
        assert_eq!(trail.last(), Some(Vector2::new(0.0, 4.0)));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut trail = Trail::with_capacity(0);
        trail.record(Vector2::new(1.0, 2.0));
        assert!(trail.is_empty());
    }
}
