use std::path::Path;

use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::approximator::Approximator;
use crate::ai::frame::{INPUT_DATA_SIZE, MINIBATCH_SIZE, NUM_ACTIONS};
use crate::error::ApproximatorError;

const FRAMES_LEN: usize = MINIBATCH_SIZE * INPUT_DATA_SIZE;
const OUTPUT_LEN: usize = MINIBATCH_SIZE * NUM_ACTIONS;

/// Per-action linear Q-function with plain SGD on the masked squared error.
/// A deliberately small baseline approximator; anything heavier plugs in
/// behind [`Approximator`] instead.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LinearQ {
    weights: Vec<f32>, // [NUM_ACTIONS * INPUT_DATA_SIZE]
    bias: Vec<f32>,    // [NUM_ACTIONS]
    learning_rate: f32,
}

impl LinearQ {
    pub fn new(learning_rate: f32, rng: &mut StdRng) -> Self {
        let mut weights = vec![0.0f32; NUM_ACTIONS * INPUT_DATA_SIZE];
        for w in weights.iter_mut() {
            *w = rng.random_range(-0.01..0.01);
        }
        LinearQ {
            weights,
            bias: vec![0.0; NUM_ACTIONS],
            learning_rate,
        }
    }

    fn q_value(&self, frame: &[f32], action: usize) -> f32 {
        let row = &self.weights[action * INPUT_DATA_SIZE..(action + 1) * INPUT_DATA_SIZE];
        let mut acc = self.bias[action];
        for (w, x) in row.iter().zip(frame.iter()) {
            acc += w * x;
        }
        acc
    }

    fn check_len(got: usize, expected: usize) -> Result<(), ApproximatorError> {
        if got != expected {
            return Err(ApproximatorError::ShapeMismatch { expected, got });
        }
        Ok(())
    }
}

impl Approximator for LinearQ {
    fn batch_forward(&mut self, frames: &[f32], q_out: &mut [f32]) -> Result<(), ApproximatorError> {
        Self::check_len(frames.len(), FRAMES_LEN)?;
        Self::check_len(q_out.len(), OUTPUT_LEN)?;

        for slot in 0..MINIBATCH_SIZE {
            let frame = &frames[slot * INPUT_DATA_SIZE..(slot + 1) * INPUT_DATA_SIZE];
            for action in 0..NUM_ACTIONS {
                q_out[slot * NUM_ACTIONS + action] = self.q_value(frame, action);
            }
        }
        Ok(())
    }

    fn train_step(
        &mut self,
        frames: &[f32],
        target: &[f32],
        filter: &[f32],
    ) -> Result<(), ApproximatorError> {
        Self::check_len(frames.len(), FRAMES_LEN)?;
        Self::check_len(target.len(), OUTPUT_LEN)?;
        Self::check_len(filter.len(), OUTPUT_LEN)?;

        for slot in 0..MINIBATCH_SIZE {
            let frame = &frames[slot * INPUT_DATA_SIZE..(slot + 1) * INPUT_DATA_SIZE];
            for action in 0..NUM_ACTIONS {
                let idx = slot * NUM_ACTIONS + action;
                if filter[idx] <= 0.5 {
                    continue;
                }
                let err = self.q_value(frame, action) - target[idx];
                let step = self.learning_rate * err;
                let row =
                    &mut self.weights[action * INPUT_DATA_SIZE..(action + 1) * INPUT_DATA_SIZE];
                for (w, x) in row.iter_mut().zip(frame.iter()) {
                    *w -= step * x;
                }
                self.bias[action] -= step;
            }
        }
        Ok(())
    }

    fn save_weights(&self, path: &Path) -> Result<(), ApproximatorError> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).map_err(|e| ApproximatorError::WeightsWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn load_weights(&mut self, path: &Path) -> Result<(), ApproximatorError> {
        let json =
            std::fs::read_to_string(path).map_err(|e| ApproximatorError::WeightsRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        let loaded: LinearQ = serde_json::from_str(&json)?;
        Self::check_len(loaded.weights.len(), NUM_ACTIONS * INPUT_DATA_SIZE)?;
        Self::check_len(loaded.bias.len(), NUM_ACTIONS)?;
        self.weights = loaded.weights;
        self.bias = loaded.bias;
        Ok(())
    }
}
