//! Motion generation counter.
//!
//! Producers (the movement pass, collision separation) bump the counter
//! whenever anything moved;
//! consumers (the quadtree owner) remember the generation they last built
//! against and rebuild when it differs. Neither side knows about the other.

use std::cell::Cell;
use std::rc::Rc;

/// Shared, monotonically increasing "something moved" counter.
///
/// Clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct MotionGeneration(Rc<Cell<u64>>);

impl MotionGeneration {
    /// Starts at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    #[inline]
    #[must_use]
    pub fn current(&self) -> u64 {
        self.0.get()
    }

    /// Advances the generation, returning the new value.
    pub fn bump(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    /// True if the generation moved past `seen`.
    #[inline]
    #[must_use]
    pub fn is_newer_than(&self, seen: u64) -> bool {
        self.current() != seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counter() {
        let producer = MotionGeneration::new();
        let consumer = producer.clone();
        let seen = consumer.current();

        assert!(!consumer.is_newer_than(seen));
        producer.bump();
        assert!(consumer.is_newer_than(seen));
        assert_eq!(consumer.current(), 1);
    }
}
