//! # ASHFALL Shared
//!
//! Common types used by every crate in the workspace.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on the ECS. It holds plain geometry and the
//! tuning constants the simulation defaults to; entity-aware code lives in
//! `ashfall_core` and above.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{FIXED_TIMESTEP, MAX_DELTA_TIME, TICK_RATE};
pub use math::{Rect, Vec2};
