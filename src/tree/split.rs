use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::arena::Orientation;

/// Source of split orientations for internal nodes that are free to go
/// either way.
pub trait SplitSource {
    fn next_orientation(&mut self) -> Orientation;
}

/// Fair coin backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomSplits<R = StdRng> {
    rng: R,
}

impl RandomSplits<StdRng> {
    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> RandomSplits<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> SplitSource for RandomSplits<R> {
    fn next_orientation(&mut self) -> Orientation {
        if self.rng.random_bool(0.5) {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }
}

/// Replays a fixed sequence of orientations, wrapping around at the end.
/// An empty script always answers `Vertical`.
#[derive(Debug, Clone)]
pub struct ScriptedSplits {
    script: Vec<Orientation>,
    cursor: usize,
}

impl ScriptedSplits {
    pub fn new(script: Vec<Orientation>) -> Self {
        Self { script, cursor: 0 }
    }

    pub fn always(orientation: Orientation) -> Self {
        Self::new(vec![orientation])
    }

    /// How many orientations have been handed out so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl SplitSource for ScriptedSplits {
    fn next_orientation(&mut self) -> Orientation {
        let orientation = if self.script.is_empty() {
            Orientation::Vertical
        } else {
            self.script[self.cursor % self.script.len()]
        };
        self.cursor += 1;
        orientation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_splits_cycle() {
        let mut splits = ScriptedSplits::new(vec![Orientation::Horizontal, Orientation::Vertical]);
        let drawn: Vec<_> = (0..5).map(|_| splits.next_orientation()).collect();
        assert_eq!(
            drawn,
            vec![
                Orientation::Horizontal,
                Orientation::Vertical,
                Orientation::Horizontal,
                Orientation::Vertical,
                Orientation::Horizontal,
            ]
        );
        assert_eq!(splits.drawn(), 5);
    }

    #[test]
    fn seeded_splits_are_reproducible() {
        let mut a = RandomSplits::seeded(42);
        let mut b = RandomSplits::seeded(42);
        for _ in 0..64 {
            assert_eq!(a.next_orientation(), b.next_orientation());
        }
    }

    #[test]
    fn random_splits_produce_both_orientations() {
        let mut splits = RandomSplits::seeded(7);
        let vertical = (0..256)
            .filter(|_| splits.next_orientation() == Orientation::Vertical)
            .count();
        assert!(vertical > 0 && vertical < 256);
    }
}
