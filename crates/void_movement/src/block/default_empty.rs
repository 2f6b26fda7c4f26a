//! Placeholder for custom navigation links nobody knows how to traverse

use super::{BlockStatus, MovementBlock};
use crate::actor::MovementUpdateContext;

/// Always fails. Produced when a path contains a custom navigation link
/// and no block factory is registered.
#[derive(Debug, Clone, Default)]
pub struct DefaultEmpty;

impl DefaultEmpty {
    pub fn new() -> Self {
        Self
    }
}

impl MovementBlock for DefaultEmpty {
    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        log::error!(
            "Entity {} reached a custom navigation link without a block to traverse it",
            context.entity_id
        );
        BlockStatus::CantBeFinished
    }

    fn name(&self) -> &str {
        "DefaultEmpty"
    }
}
