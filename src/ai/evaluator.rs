use crate::ai::approximator::Approximator;
use crate::ai::frame::{self, Window, INPUT_DATA_SIZE, MINIBATCH_SIZE, NUM_ACTIONS};
use crate::error::TrainingError;

/// One policy decision. `Random` marks that exploration (or a legality
/// fallback) chose the action; it carries no value and is never compared
/// against greedy values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Policy {
    Greedy { action: usize, value: f32 },
    Random { action: usize },
}

impl Policy {
    pub fn action(&self) -> usize {
        match *self {
            Policy::Greedy { action, .. } => action,
            Policy::Random { action } => action,
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, Policy::Random { .. })
    }
}

/// Greedy choice for one batch slot; `None` means no action was legal and
/// the caller must defer to a random legal action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Greedy {
    pub action: usize,
    pub value: f32,
}

/// Batch policy evaluation over temporal windows.
///
/// The input tensor is always a full minibatch; unused slots are zero
/// padded. Buffers are allocated once and reused every call.
pub struct Evaluator {
    frames_input: Vec<f32>,
    q_values: Vec<f32>,
    choices: Vec<Option<Greedy>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator {
            frames_input: vec![0.0; MINIBATCH_SIZE * INPUT_DATA_SIZE],
            q_values: vec![0.0; MINIBATCH_SIZE * NUM_ACTIONS],
            choices: vec![None; MINIBATCH_SIZE],
        }
    }

    /// Evaluate a batch of windows in one approximator forward pass and pick
    /// the best legal action per slot. Ties keep the lowest-index action.
    /// A non-finite q-value is fatal.
    pub fn evaluate<F>(
        &mut self,
        batch: &[Window],
        is_valid_action: F,
        approximator: &mut dyn Approximator,
    ) -> Result<&[Option<Greedy>], TrainingError>
    where
        F: Fn(usize) -> bool,
    {
        assert!(!batch.is_empty(), "empty evaluation batch");
        assert!(batch.len() <= MINIBATCH_SIZE, "evaluation batch too large");

        for (window, slot) in batch
            .iter()
            .zip(self.frames_input.chunks_exact_mut(INPUT_DATA_SIZE))
        {
            frame::write_window(window, slot);
        }
        for slot in self.frames_input[batch.len() * INPUT_DATA_SIZE..].iter_mut() {
            *slot = 0.0;
        }

        approximator.batch_forward(&self.frames_input, &mut self.q_values)?;

        for (index, choice) in self.choices.iter_mut().take(batch.len()).enumerate() {
            let mut best: Option<Greedy> = None;
            for action in 0..NUM_ACTIONS {
                if !is_valid_action(action) {
                    continue;
                }
                let value = self.q_values[index * NUM_ACTIONS + action];
                if !value.is_finite() {
                    return Err(TrainingError::NonFiniteQ { action, value });
                }
                match best {
                    Some(b) if value <= b.value => {}
                    _ => best = Some(Greedy { action, value }),
                }
            }
            *choice = best;
        }

        Ok(&self.choices[..batch.len()])
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
