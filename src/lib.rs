//! # ML Grid Arena
//!
//! A tick-based, multi-agent grid arena trained with deep Q-learning.
//! Per-agent observations and rewards are assembled into temporal-window
//! experiences, stored in a bounded replay memory, and turned into
//! masked-regression minibatches driving a pluggable Q-function
//! approximator.
//!
//! ## Modules
//!
//! - [`ai`] — Training core: frames, replay memory, exploration schedule,
//!   brain (two-phase experience assembly), evaluator, trainer, network facade
//! - [`sim`] — Grid world, pawn archetypes, observation encoding
//! - [`training`] — Headless training loop and rolling metrics
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod sim;
pub mod training;
