//! Tick-based grid arena: pawn archetypes, the world loop, and the
//! egocentric observation capture that feeds the learning core.

pub mod observe;
pub mod pawn;
pub mod world;

pub use pawn::{Archetype, Pawn, PawnKind};
pub use world::{Vec2, World};
