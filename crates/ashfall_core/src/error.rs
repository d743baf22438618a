//! # Core Error Types
//!
//! Errors for world-level operations addressed by entity id.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur when addressing the world by entity id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// No committed entity has this id (never created, not yet flushed, or purged).
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),
}

/// Result type for world operations.
pub type EcsResult<T> = Result<T, EcsError>;
