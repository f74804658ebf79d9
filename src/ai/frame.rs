use std::collections::VecDeque;
use std::sync::Arc;

/// Number of past frames kept in addition to the current one.
pub const TEMPORAL_WINDOW: usize = 3;
/// Frames per temporal window fed to the approximator.
pub const WINDOW_LENGTH: usize = TEMPORAL_WINDOW + 1;

/// Side length of the egocentric sight window.
pub const SIGHT_DIAMETER: usize = 16;
pub const SIGHT_AREA: usize = SIGHT_DIAMETER * SIGHT_DIAMETER;

pub const MAX_SKILLS: usize = 2;
pub const NUM_MOVE_DIRS: usize = 4;
/// Attack + four moves + skill slots.
pub const NUM_ACTIONS: usize = 1 + NUM_MOVE_DIRS + MAX_SKILLS;

/// Image planes: in-bounds, ally health, enemy health, ally kind, enemy kind,
/// plus one threat plane per skill slot.
pub const CHANNELS: usize = 5 + MAX_SKILLS;
/// Scalar stats: health, cooldown, x, y, plus one cooldown per skill slot.
pub const NUM_STATS: usize = 4 + MAX_SKILLS;

pub const IMAGE_SIZE: usize = SIGHT_AREA * CHANNELS;
pub const FRAME_SIZE: usize = IMAGE_SIZE + NUM_STATS;
/// Flattened size of one temporal window in the input tensor.
pub const INPUT_DATA_SIZE: usize = WINDOW_LENGTH * FRAME_SIZE;

pub const MINIBATCH_SIZE: usize = 32;

/// One agent's observation snapshot for one tick. Immutable once built;
/// shared between temporal windows and experiences via [`FrameRef`].
#[derive(Debug)]
pub struct Frame {
    image: Vec<f32>,
    stats: [f32; NUM_STATS],
}

pub type FrameRef = Arc<Frame>;

impl Frame {
    pub fn new(image: Vec<f32>, stats: [f32; NUM_STATS]) -> Self {
        assert_eq!(image.len(), IMAGE_SIZE, "frame image has wrong size");
        Frame { image, stats }
    }

    pub fn zeroed() -> Self {
        Frame {
            image: vec![0.0; IMAGE_SIZE],
            stats: [0.0; NUM_STATS],
        }
    }

    pub fn image(&self) -> &[f32] {
        &self.image
    }

    pub fn stats(&self) -> &[f32; NUM_STATS] {
        &self.stats
    }

    /// Copy this frame into one frame-sized slot of an input tensor.
    pub fn write_into(&self, slot: &mut [f32]) {
        debug_assert_eq!(slot.len(), FRAME_SIZE);
        slot[..IMAGE_SIZE].copy_from_slice(&self.image);
        slot[IMAGE_SIZE..].copy_from_slice(&self.stats);
    }
}

/// A fixed-length temporal window of frame references, oldest first.
/// Empty slots stand for missing history and are written as zeros.
#[derive(Clone, Debug, Default)]
pub struct Window {
    frames: [Option<FrameRef>; WINDOW_LENGTH],
}

impl Window {
    pub fn empty() -> Self {
        Window::default()
    }

    /// Snapshot the most recent `WINDOW_LENGTH` frames of a sliding deque.
    pub fn from_deque(deque: &VecDeque<FrameRef>) -> Self {
        assert!(deque.len() >= WINDOW_LENGTH, "frame window not full yet");
        let mut frames: [Option<FrameRef>; WINDOW_LENGTH] = Default::default();
        let skip = deque.len() - WINDOW_LENGTH;
        for (slot, frame) in frames.iter_mut().zip(deque.iter().skip(skip)) {
            *slot = Some(frame.clone());
        }
        Window { frames }
    }

    /// The next state's window: this window shifted left by one with `next`
    /// appended, reusing all but the oldest frame.
    pub fn shifted(&self, next: FrameRef) -> Self {
        let mut frames: [Option<FrameRef>; WINDOW_LENGTH] = Default::default();
        for i in 0..WINDOW_LENGTH - 1 {
            frames[i] = self.frames[i + 1].clone();
        }
        frames[WINDOW_LENGTH - 1] = Some(next);
        Window { frames }
    }

    pub fn frames(&self) -> &[Option<FrameRef>; WINDOW_LENGTH] {
        &self.frames
    }

    pub fn is_complete(&self) -> bool {
        self.frames.iter().all(|f| f.is_some())
    }
}

/// Flatten a window into one window-sized slot of an input tensor,
/// zero-filling empty frame slots.
pub fn write_window(window: &Window, out: &mut [f32]) {
    debug_assert_eq!(out.len(), INPUT_DATA_SIZE);
    for (frame, slot) in window.frames().iter().zip(out.chunks_exact_mut(FRAME_SIZE)) {
        match frame {
            Some(f) => f.write_into(slot),
            None => slot.fill(0.0),
        }
    }
}
