use std::path::Path;
use std::slice;

use rand::rngs::StdRng;

use crate::ai::approximator::Approximator;
use crate::ai::epsilon::AnnealedEpsilon;
use crate::ai::evaluator::{Evaluator, Policy};
use crate::ai::frame::Window;
use crate::ai::replay::{Experience, ReplayMemory};
use crate::ai::trainer::Trainer;
use crate::config::DqnConfig;
use crate::error::TrainingError;

/// One Q-network: approximator, replay memory, exploration schedule, and the
/// shared evaluation/training buffers. Several agents may drive the same
/// network; their experiences pool into one replay memory and one schedule.
pub struct QNetwork {
    approximator: Box<dyn Approximator>,
    replay: ReplayMemory,
    epsilon: AnnealedEpsilon,
    evaluator: Evaluator,
    trainer: Trainer,
    gamma: f32,
}

impl QNetwork {
    pub fn new(config: &DqnConfig, approximator: Box<dyn Approximator>) -> Self {
        let burnin = config.resolved_burnin();
        QNetwork {
            approximator,
            replay: ReplayMemory::new(config.experience_size),
            epsilon: AnnealedEpsilon::new(
                config.epsilon_min,
                config.epsilon_test,
                burnin,
                config.learning_steps_total,
            ),
            evaluator: Evaluator::new(),
            trainer: Trainer::new(),
            gamma: config.gamma,
        }
    }

    /// Epsilon-greedy action selection for one window. Falls back to a random
    /// legal action when exploration triggers or no action passes the
    /// legality filter.
    pub fn predict(
        &mut self,
        window: &Window,
        is_valid_action: &dyn Fn(usize) -> bool,
        random_action: &mut dyn FnMut(&mut StdRng) -> usize,
        rng: &mut StdRng,
    ) -> Result<Policy, TrainingError> {
        if self.epsilon.should_explore(rng) {
            return Ok(Policy::Random {
                action: random_action(rng),
            });
        }
        let choices = self.evaluator.evaluate(
            slice::from_ref(window),
            is_valid_action,
            self.approximator.as_mut(),
        )?;
        Ok(match choices[0] {
            Some(greedy) => Policy::Greedy {
                action: greedy.action,
                value: greedy.value,
            },
            None => Policy::Random {
                action: random_action(rng),
            },
        })
    }

    /// Validate and store one experience, advancing the annealing schedule.
    pub fn commit(&mut self, experience: Experience, rng: &mut StdRng) -> Result<(), TrainingError> {
        experience.check_sanity()?;
        self.epsilon.bump();
        self.replay.push(experience, rng);
        Ok(())
    }

    /// One training step if learning is on and the burn-in has been met.
    /// Returns whether a gradient step actually ran.
    pub fn train(&mut self, rng: &mut StdRng) -> Result<bool, TrainingError> {
        if !self.epsilon.is_learning || !self.replay.has_enough(self.epsilon.burnin()) {
            return Ok(false);
        }
        self.trainer.step(
            &self.replay,
            &mut self.evaluator,
            self.approximator.as_mut(),
            self.gamma,
            rng,
        )?;
        Ok(true)
    }

    pub fn is_learning(&self) -> bool {
        self.epsilon.is_learning
    }

    pub fn set_learning(&mut self, learning: bool) {
        self.epsilon.is_learning = learning;
    }

    pub fn epsilon(&self) -> &AnnealedEpsilon {
        &self.epsilon
    }

    pub fn replay(&self) -> &ReplayMemory {
        &self.replay
    }

    pub fn save_weights(&self, path: &Path) -> Result<(), TrainingError> {
        self.approximator.save_weights(path)?;
        Ok(())
    }

    pub fn load_weights(&mut self, path: &Path) -> Result<(), TrainingError> {
        self.approximator.load_weights(path)?;
        Ok(())
    }
}
