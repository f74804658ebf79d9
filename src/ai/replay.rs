use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::frame::{FrameRef, Window, NUM_ACTIONS};
use crate::error::TrainingError;

/// One (state-window, action, reward, next-state) training sample.
/// `next_frame` is `None` exactly when the episode terminated on this
/// transition; terminal targets get no bootstrap term.
#[derive(Clone, Debug)]
pub struct Experience {
    pub window: Window,
    pub action: usize,
    pub reward: f32,
    pub next_frame: Option<FrameRef>,
}

impl Experience {
    pub fn check_sanity(&self) -> Result<(), TrainingError> {
        if !self.reward.is_finite() || !(-1.0..=1.0).contains(&self.reward) {
            return Err(TrainingError::InvalidReward(self.reward));
        }
        if self.action >= NUM_ACTIONS {
            return Err(TrainingError::InvalidAction(self.action));
        }
        Ok(())
    }
}

/// Fixed-capacity experience store. Appends while under capacity; once full,
/// each new experience overwrites a uniformly-random existing slot. This is
/// deliberately not true reservoir sampling (recent items are statistically
/// more likely to survive) and the bias is part of the sampling contract.
pub struct ReplayMemory {
    experiences: Vec<Experience>,
    capacity: usize,
}

impl ReplayMemory {
    pub fn new(capacity: usize) -> Self {
        ReplayMemory {
            experiences: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether enough experience has accumulated to start training.
    pub fn has_enough(&self, burnin: usize) -> bool {
        self.experiences.len() > burnin
    }

    pub fn push(&mut self, experience: Experience, rng: &mut StdRng) {
        if self.experiences.len() < self.capacity {
            self.experiences.push(experience);
        } else {
            let slot = rng.random_range(0..self.capacity);
            self.experiences[slot] = experience;
        }
    }

    /// Uniform random sample; callers draw repeatedly for a minibatch, so
    /// sampling is with repetition.
    pub fn sample(&self, rng: &mut StdRng) -> &Experience {
        assert!(!self.experiences.is_empty(), "sampling empty replay memory");
        let idx = rng.random_range(0..self.experiences.len());
        &self.experiences[idx]
    }

    pub fn as_slice(&self) -> &[Experience] {
        &self.experiences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn experience(id: usize) -> Experience {
        Experience {
            window: Window::empty(),
            action: id % NUM_ACTIONS,
            reward: 0.0,
            next_frame: None,
        }
    }

    #[test]
    fn test_push_appends_under_capacity() {
        let mut memory = ReplayMemory::new(10);
        let mut rng = StdRng::seed_from_u64(1);
        for i in 0..10 {
            memory.push(experience(i), &mut rng);
            assert_eq!(memory.len(), i + 1);
        }
    }

    #[test]
    fn test_push_never_exceeds_capacity() {
        let mut memory = ReplayMemory::new(5);
        let mut rng = StdRng::seed_from_u64(2);
        for i in 0..50 {
            memory.push(experience(i), &mut rng);
            assert!(memory.len() <= 5);
        }
        assert_eq!(memory.len(), 5);
    }

    #[test]
    fn test_has_enough() {
        let mut memory = ReplayMemory::new(10);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(!memory.has_enough(2));
        for i in 0..3 {
            memory.push(experience(i), &mut rng);
        }
        assert!(memory.has_enough(2));
        assert!(!memory.has_enough(3));
    }

    #[test]
    fn test_sample_returns_stored_experience() {
        let mut memory = ReplayMemory::new(10);
        let mut rng = StdRng::seed_from_u64(4);
        memory.push(experience(3), &mut rng);
        for _ in 0..20 {
            assert_eq!(memory.sample(&mut rng).action, 3);
        }
    }

    #[test]
    #[should_panic(expected = "empty replay memory")]
    fn test_sample_empty_panics() {
        let memory = ReplayMemory::new(4);
        let mut rng = StdRng::seed_from_u64(5);
        memory.sample(&mut rng);
    }

    #[test]
    fn test_invalid_reward_fails_sanity() {
        let mut e = experience(0);
        e.reward = f32::NAN;
        assert!(e.check_sanity().is_err());
        e.reward = 2.0;
        assert!(e.check_sanity().is_err());
        e.reward = -1.0;
        assert!(e.check_sanity().is_ok());
    }

    #[test]
    fn test_out_of_range_action_fails_sanity() {
        let mut e = experience(0);
        e.action = NUM_ACTIONS;
        assert!(e.check_sanity().is_err());
    }

    /// The first overwrite after reaching capacity should hit each slot with
    /// roughly equal frequency.
    #[test]
    fn test_overwrite_slot_roughly_uniform() {
        const CAPACITY: usize = 4;
        const RUNS: usize = 2000;
        let mut hits = [0usize; CAPACITY];

        for run in 0..RUNS {
            let mut memory = ReplayMemory::new(CAPACITY);
            let mut rng = StdRng::seed_from_u64(run as u64);
            for i in 0..CAPACITY {
                memory.push(experience(i), &mut rng);
            }
            memory.push(experience(CAPACITY), &mut rng);
            let evicted = (0..CAPACITY)
                .find(|&slot| memory.as_slice()[slot].action == CAPACITY % NUM_ACTIONS)
                .expect("one slot must have been overwritten");
            hits[evicted] += 1;
        }

        // Expected 500 per slot; allow a generous band.
        for (slot, &count) in hits.iter().enumerate() {
            assert!(
                (350..=650).contains(&count),
                "slot {} overwritten {} times, not roughly uniform",
                slot,
                count
            );
        }
    }
}
