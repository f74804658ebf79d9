use std::path::Path;

use crate::error::ApproximatorError;

/// Narrow seam to the Q-function approximator. The training core only ever
/// issues whole-minibatch forward passes and masked-regression gradient
/// steps; topology, optimizer, and backend live entirely behind this trait.
///
/// Tensor shapes (flattened, row-major):
/// - `frames`: `[MINIBATCH_SIZE * INPUT_DATA_SIZE]`
/// - `q_out`, `target`, `filter`: `[MINIBATCH_SIZE * NUM_ACTIONS]`
pub trait Approximator {
    /// One forward pass for a padded minibatch, writing q-values per
    /// (slot, action) into `q_out`.
    fn batch_forward(&mut self, frames: &[f32], q_out: &mut [f32]) -> Result<(), ApproximatorError>;

    /// One gradient step of masked regression: each slot is updated toward
    /// `target` only where `filter` is set.
    fn train_step(
        &mut self,
        frames: &[f32],
        target: &[f32],
        filter: &[f32],
    ) -> Result<(), ApproximatorError>;

    /// Persist weights. Must not disturb any in-flight training state held
    /// by the caller; safe to call between simulation epochs.
    fn save_weights(&self, path: &Path) -> Result<(), ApproximatorError>;

    fn load_weights(&mut self, path: &Path) -> Result<(), ApproximatorError>;
}
