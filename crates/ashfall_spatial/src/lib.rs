//! # ASHFALL Spatial
//!
//! Two spatial indices tuned for different access patterns:
//!
//! | Index | Used by | Strategy |
//! |-------|---------|----------|
//! | [`SpatialGrid`] | collision broad-phase | fixed cells, re-filled every pass |
//! | [`Quadtree`] | viewport / range queries | recursive subdivision, lazy rebuild |
//!
//! [`MotionGeneration`] is the shared "something moved" counter the quadtree
//! owner compares against to decide whether a rebuild is due.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod generation;
pub mod grid;
pub mod quadtree;

pub use generation::MotionGeneration;
pub use grid::SpatialGrid;
pub use quadtree::Quadtree;
