//! Procedural stair path generation
//!
//! The path is a biased random walk over two directions: each new step repeats
//! the previous one unless a flip roll succeeds. Flips are always rarer than
//! repeats, so the stairs form runs the player can read ahead.

use rand::Rng;

use super::state::{Direction, StepPath};
use crate::tuning::Tuning;

/// Direction every path starts with
pub const START_DIRECTION: Direction = Direction::Right;

/// Flip probabilities for the biased walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipPolicy {
    /// Flip chance while building the opening path
    p_initial: f64,
    /// Flip chance while extending during play
    p_extend: f64,
    /// Opening steps that never flip
    warmup_steps: usize,
}

impl FlipPolicy {
    /// Build a policy. Probabilities at or above 0.5 (or NaN) are clamped just
    /// below 0.5 and logged, since a coin-flip walk loses all clustering.
    pub fn new(p_initial: f64, p_extend: f64, warmup_steps: usize) -> Self {
        Self {
            p_initial: Self::sanitize(p_initial, "p_initial"),
            p_extend: Self::sanitize(p_extend, "p_extend"),
            warmup_steps,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(
            tuning.p_flip_initial,
            tuning.p_flip_extend,
            tuning.warmup_steps,
        )
    }

    fn sanitize(p: f64, name: &str) -> f64 {
        const MAX_FLIP: f64 = 0.49;
        if p.is_nan() || p < 0.0 {
            log::warn!("Flip probability {name}={p} invalid, using 0");
            0.0
        } else if p >= 0.5 {
            log::warn!("Flip probability {name}={p} would remove clustering, clamping to {MAX_FLIP}");
            MAX_FLIP
        } else {
            p
        }
    }

    pub fn p_initial(&self) -> f64 {
        self.p_initial
    }

    pub fn p_extend(&self) -> f64 {
        self.p_extend
    }

    pub fn warmup_steps(&self) -> usize {
        self.warmup_steps
    }
}

impl Default for FlipPolicy {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

/// Generates and extends stair paths from an injected random source
#[derive(Debug, Clone)]
pub struct PathGenerator<R> {
    policy: FlipPolicy,
    rng: R,
}

impl<R: Rng> PathGenerator<R> {
    pub fn new(policy: FlipPolicy, rng: R) -> Self {
        Self { policy, rng }
    }

    pub fn policy(&self) -> &FlipPolicy {
        &self.policy
    }

    /// Opening path of `length` steps, starting `Right`.
    ///
    /// Steps inside the warm-up never flip so the session cannot open with an
    /// immediate turn.
    pub fn generate_initial(&mut self, length: usize) -> StepPath {
        let mut path = StepPath::with_capacity(length);
        let mut current = START_DIRECTION;
        for i in 0..length {
            if i >= self.policy.warmup_steps && self.rng.random_bool(self.policy.p_initial) {
                current = current.opposite();
            }
            path.push(current);
        }
        path
    }

    /// Append `count` steps continuing from the last element of `path`.
    ///
    /// Only the back of the window is read and only new elements are written.
    pub fn extend(&mut self, path: &mut StepPath, count: usize) {
        let mut current = path.last().unwrap_or(START_DIRECTION);
        for _ in 0..count {
            if self.rng.random_bool(self.policy.p_extend) {
                current = current.opposite();
            }
            path.push(current);
        }
    }

    /// Extend `path` until it holds at least `min_len` steps. Returns how many
    /// steps were added.
    pub fn refill(&mut self, path: &mut StepPath, min_len: usize) -> usize {
        let missing = min_len.saturating_sub(path.len());
        if missing > 0 {
            self.extend(path, missing);
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn generator(seed: u64) -> PathGenerator<Pcg32> {
        PathGenerator::new(FlipPolicy::default(), Pcg32::seed_from_u64(seed))
    }

    #[test]
    fn test_initial_length_and_warmup() {
        let mut g = generator(1);
        for _ in 0..50 {
            let path = g.generate_initial(20);
            assert_eq!(path.len(), 20);
            for i in 0..4 {
                assert_eq!(path.get(i), Some(Direction::Right));
            }
        }
    }

    #[test]
    fn test_zero_length() {
        let mut g = generator(2);
        assert!(g.generate_initial(0).is_empty());

        let mut path = g.generate_initial(5);
        let before = path.clone();
        g.extend(&mut path, 0);
        assert_eq!(path, before);
    }

    #[test]
    fn test_extend_is_pure_append() {
        let mut g = generator(3);
        let mut path = g.generate_initial(20);
        let before = path.prefix(20);
        g.extend(&mut path, 30);
        assert_eq!(path.len(), 50);
        assert_eq!(path.prefix(20), before);
    }

    #[test]
    fn test_extend_empty_starts_right_with_no_flips() {
        let policy = FlipPolicy::new(0.0, 0.0, 0);
        let mut g = PathGenerator::new(policy, Pcg32::seed_from_u64(4));
        let mut path = StepPath::new();
        g.extend(&mut path, 5);
        assert!(path.iter().all(|d| d == Direction::Right));

        let mut left: StepPath = [Direction::Left].into_iter().collect();
        g.extend(&mut left, 5);
        assert!(left.iter().all(|d| d == Direction::Left));
    }

    #[test]
    fn test_refill_reaches_minimum() {
        let mut g = generator(5);
        let mut path = g.generate_initial(3);
        assert_eq!(g.refill(&mut path, 12), 9);
        assert_eq!(path.len(), 12);
        assert_eq!(g.refill(&mut path, 12), 0);
    }

    #[test]
    fn test_uniform_policy_is_clamped() {
        let policy = FlipPolicy::new(0.5, 0.9, 4);
        assert!(policy.p_initial() < 0.5);
        assert!(policy.p_extend() < 0.5);
        let policy = FlipPolicy::new(f64::NAN, -1.0, 4);
        assert_eq!(policy.p_initial(), 0.0);
        assert_eq!(policy.p_extend(), 0.0);
    }

    #[test]
    fn test_cluster_bias() {
        let mut g = generator(0xC1A5);
        let mut path = g.generate_initial(20);
        g.extend(&mut path, 100_000);

        let steps: Vec<Direction> = path.iter().collect();
        let repeats = steps.windows(2).filter(|w| w[0] == w[1]).count();
        let ratio = repeats as f64 / (steps.len() - 1) as f64;
        assert!(ratio > 0.5, "repeat ratio {ratio} shows no clustering");
        // Extension flips ~30% of the time
        assert!((ratio - 0.7).abs() < 0.02, "repeat ratio {ratio}");
    }
}
