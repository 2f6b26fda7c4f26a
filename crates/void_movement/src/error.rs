//! Error types for the movement system

use crate::id::{EntityId, MovementRequestId};
use thiserror::Error;

/// Movement system errors
#[derive(Debug, Error)]
pub enum MovementError {
    /// No movement actor is registered for the entity
    #[error("Entity {0} is not registered with the movement system")]
    ActorNotRegistered(EntityId),

    /// The request handle is unknown or no longer valid
    #[error("Unknown movement request: {0}")]
    UnknownRequest(MovementRequestId),

    /// Invalid configuration
    #[error("Invalid movement configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Failed to parse movement configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type for movement operations
pub type Result<T> = std::result::Result<T, MovementError>;
