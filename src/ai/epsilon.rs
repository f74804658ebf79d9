use rand::rngs::StdRng;
use rand::Rng;

/// Age-based linear annealing of the exploration probability.
///
/// While learning, the probability decays linearly from 1.0 at
/// `age == burnin` down to `epsilon_min` at `age == total_steps`, clamped to
/// `[epsilon_min, 1.0]`. Outside learning mode a fixed small `epsilon_test`
/// applies. Age advances once per experience committed to replay memory,
/// not per simulation tick.
#[derive(Debug, Clone)]
pub struct AnnealedEpsilon {
    pub is_learning: bool,
    age: usize,
    epsilon_min: f32,
    epsilon_test: f32,
    burnin: usize,
    total_steps: usize,
}

impl AnnealedEpsilon {
    /// `total_steps` must be strictly greater than `burnin`.
    pub fn new(epsilon_min: f32, epsilon_test: f32, burnin: usize, total_steps: usize) -> Self {
        assert!(total_steps > burnin, "total_steps must exceed burnin");
        AnnealedEpsilon {
            is_learning: true,
            age: 0,
            epsilon_min,
            epsilon_test,
            burnin,
            total_steps,
        }
    }

    /// Current exploration probability, always in `[0, 1]`.
    pub fn get(&self) -> f32 {
        if self.is_learning {
            let span = (self.total_steps - self.burnin) as f32;
            let progress = (self.age as f32 - self.burnin as f32) / span;
            (1.0 - progress).clamp(self.epsilon_min, 1.0)
        } else {
            self.epsilon_test
        }
    }

    /// Draw once against the current probability.
    pub fn should_explore(&self, rng: &mut StdRng) -> bool {
        let dice: f32 = rng.random();
        dice < self.get()
    }

    /// Advance the schedule by one committed experience.
    pub fn bump(&mut self) {
        self.age += 1;
    }

    pub fn age(&self) -> usize {
        self.age
    }

    pub fn burnin(&self) -> usize {
        self.burnin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_pure_exploration_before_burnin() {
        let eps = AnnealedEpsilon::new(0.1, 0.05, 100, 1000);
        assert_eq!(eps.get(), 1.0);
    }

    #[test]
    fn test_linear_anneal_midway() {
        let mut eps = AnnealedEpsilon::new(0.1, 0.05, 0, 100);
        for _ in 0..50 {
            eps.bump();
        }
        assert!((eps.get() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_floors_at_epsilon_min() {
        let mut eps = AnnealedEpsilon::new(0.1, 0.05, 0, 100);
        for _ in 0..500 {
            eps.bump();
        }
        assert!((eps.get() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_monotone_non_increasing_while_learning() {
        let mut eps = AnnealedEpsilon::new(0.1, 0.05, 10, 200);
        let mut last = eps.get();
        for _ in 0..250 {
            eps.bump();
            let p = eps.get();
            assert!(p <= last, "epsilon increased: {} -> {}", last, p);
            assert!((0.1..=1.0).contains(&p));
            last = p;
        }
    }

    #[test]
    fn test_test_mode_is_fixed() {
        let mut eps = AnnealedEpsilon::new(0.1, 0.05, 0, 100);
        eps.is_learning = false;
        assert_eq!(eps.get(), 0.05);
        for _ in 0..50 {
            eps.bump();
        }
        assert_eq!(eps.get(), 0.05);
    }

    #[test]
    fn test_should_explore_always_at_full_epsilon() {
        let eps = AnnealedEpsilon::new(0.1, 0.05, 100, 1000);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(eps.should_explore(&mut rng));
        }
    }
}
