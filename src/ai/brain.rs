use std::collections::VecDeque;

use rand::rngs::StdRng;

use crate::ai::frame::{FrameRef, Window, TEMPORAL_WINDOW, WINDOW_LENGTH};
use crate::ai::network::QNetwork;
use crate::ai::replay::Experience;
use crate::error::TrainingError;

/// An experience whose outcome is not known yet: the action has been chosen
/// but the reward arrives at the end of the tick and the successor frame
/// only on the next forward pass.
struct PendingExperience {
    window: Window,
    action: usize,
    reward: f32,
}

/// Per-agent interface to a shared [`QNetwork`].
///
/// The brain keeps the agent's recent frames, runs the two-phase experience
/// assembly (forward chooses an action, backward attaches the reward, the
/// next forward supplies the successor frame and commits), and acts randomly
/// while the temporal window is still warming up.
pub struct Brain {
    frame_window: VecDeque<FrameRef>,
    forward_passes: usize,
    pending: Option<PendingExperience>,
}

impl Brain {
    pub fn new() -> Self {
        Brain {
            frame_window: VecDeque::with_capacity(WINDOW_LENGTH),
            forward_passes: 0,
            pending: None,
        }
    }

    /// Observe a frame and choose an action. Commits the previous tick's
    /// experience first, using this frame as its successor state.
    pub fn forward(
        &mut self,
        net: &mut QNetwork,
        frame: FrameRef,
        is_valid_action: &dyn Fn(usize) -> bool,
        random_action: &mut dyn FnMut(&mut StdRng) -> usize,
        rng: &mut StdRng,
    ) -> Result<usize, TrainingError> {
        self.forward_passes += 1;
        self.flush(net, Some(frame.clone()), rng)?;

        self.frame_window.push_back(frame);
        if self.frame_window.len() > WINDOW_LENGTH {
            self.frame_window.pop_front();
        }

        if self.forward_passes <= TEMPORAL_WINDOW {
            // Not enough history for a full window; act randomly and learn
            // nothing from it.
            return Ok(random_action(rng));
        }

        let window = Window::from_deque(&self.frame_window);
        let policy = net.predict(&window, is_valid_action, random_action, rng)?;
        let action = policy.action();
        if net.is_learning() {
            self.pending = Some(PendingExperience {
                window,
                action,
                reward: 0.0,
            });
        }
        Ok(action)
    }

    /// Attach the tick's reward to the pending experience, if any.
    pub fn backward(&mut self, reward: f32) {
        if let Some(pending) = self.pending.as_mut() {
            pending.reward = reward;
        }
    }

    /// Commit the pending experience as terminal (no successor state).
    pub fn notify_terminal(
        &mut self,
        net: &mut QNetwork,
        rng: &mut StdRng,
    ) -> Result<(), TrainingError> {
        self.flush(net, None, rng)
    }

    fn flush(
        &mut self,
        net: &mut QNetwork,
        next_frame: Option<FrameRef>,
        rng: &mut StdRng,
    ) -> Result<(), TrainingError> {
        if let Some(pending) = self.pending.take() {
            net.commit(
                Experience {
                    window: pending.window,
                    action: pending.action,
                    reward: pending.reward,
                    next_frame,
                },
                rng,
            )?;
        }
        Ok(())
    }
}

impl Default for Brain {
    fn default() -> Self {
        Self::new()
    }
}
