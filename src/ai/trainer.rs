use rand::rngs::StdRng;

use crate::ai::approximator::Approximator;
use crate::ai::evaluator::Evaluator;
use crate::ai::frame::{self, Window, INPUT_DATA_SIZE, MINIBATCH_SIZE, NUM_ACTIONS};
use crate::ai::replay::{Experience, ReplayMemory};
use crate::error::TrainingError;

/// One SGD step over a sampled minibatch.
///
/// Targets follow the standard one-step bootstrap: `r + gamma * max_a Q(s')`
/// for ongoing transitions, bare `r` for terminal ones. Only the taken
/// action's output is regressed; the filter tensor masks out the rest so the
/// approximator leaves all other action heads untouched.
pub struct Trainer {
    samples: Vec<Experience>,
    bootstrap: Vec<Window>,
    frames_input: Vec<f32>,
    target: Vec<f32>,
    filter: Vec<f32>,
}

impl Trainer {
    pub fn new() -> Self {
        Trainer {
            samples: Vec::with_capacity(MINIBATCH_SIZE),
            bootstrap: Vec::with_capacity(MINIBATCH_SIZE),
            frames_input: vec![0.0; MINIBATCH_SIZE * INPUT_DATA_SIZE],
            target: vec![0.0; MINIBATCH_SIZE * NUM_ACTIONS],
            filter: vec![0.0; MINIBATCH_SIZE * NUM_ACTIONS],
        }
    }

    /// Sample a full minibatch (with repetition) and run one gradient step.
    pub fn step(
        &mut self,
        replay: &ReplayMemory,
        evaluator: &mut Evaluator,
        approximator: &mut dyn Approximator,
        gamma: f32,
        rng: &mut StdRng,
    ) -> Result<(), TrainingError> {
        self.samples.clear();
        self.bootstrap.clear();
        for _ in 0..MINIBATCH_SIZE {
            let experience = replay.sample(rng).clone();
            experience.check_sanity()?;
            self.bootstrap.push(match &experience.next_frame {
                Some(next) => experience.window.shifted(next.clone()),
                None => Window::empty(),
            });
            self.samples.push(experience);
        }

        // Copy the bootstrap values out so the evaluator borrow ends before
        // the tensors are filled.
        let mut next_values = [0.0f32; MINIBATCH_SIZE];
        let choices = evaluator.evaluate(&self.bootstrap, |_| true, approximator)?;
        for (value, choice) in next_values.iter_mut().zip(choices.iter()) {
            *value = choice.map(|greedy| greedy.value).unwrap_or(0.0);
        }

        self.target.iter_mut().for_each(|t| *t = 0.0);
        self.filter.iter_mut().for_each(|f| *f = 0.0);

        for (slot, experience) in self.samples.iter().enumerate() {
            let value = match experience.next_frame {
                Some(_) => experience.reward + gamma * next_values[slot],
                None => experience.reward,
            };
            if !value.is_finite() {
                return Err(TrainingError::NonFiniteTarget(value));
            }
            frame::write_window(
                &experience.window,
                &mut self.frames_input[slot * INPUT_DATA_SIZE..(slot + 1) * INPUT_DATA_SIZE],
            );
            self.target[slot * NUM_ACTIONS + experience.action] = value;
            self.filter[slot * NUM_ACTIONS + experience.action] = 1.0;
        }

        approximator.train_step(&self.frames_input, &self.target, &self.filter)?;
        Ok(())
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}
