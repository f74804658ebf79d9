//! DQN training core: frame windows, replay memory, exploration schedule,
//! policy evaluation, and minibatch training, tied together per network by
//! [`QNetwork`] and per agent by [`Brain`].

pub mod approximator;
pub mod brain;
pub mod epsilon;
pub mod evaluator;
pub mod frame;
pub mod linear;
pub mod network;
pub mod replay;
pub mod trainer;

pub use approximator::Approximator;
pub use brain::Brain;
pub use epsilon::AnnealedEpsilon;
pub use evaluator::{Evaluator, Policy};
pub use frame::{Frame, FrameRef, Window};
pub use linear::LinearQ;
pub use network::QNetwork;
pub use replay::{Experience, ReplayMemory};
pub use trainer::Trainer;
