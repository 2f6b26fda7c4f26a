//! Immediate stop

use super::{BlockStatus, MovementBlock};
use crate::actor::{ActorBindings, MovementUpdateContext};

/// Clears the movement output and waits until the agent stands still
#[derive(Debug, Clone, Default)]
pub struct HarshStop;

impl HarshStop {
    pub fn new() -> Self {
        Self
    }
}

impl MovementBlock for HarshStop {
    fn begin(&mut self, actor: &mut ActorBindings) {
        actor.adapter.clear_movement_state();
    }

    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        let adapter = &mut context.actor.adapter;
        adapter.clear_movement_state();

        if adapter.is_moving() {
            BlockStatus::Running
        } else {
            BlockStatus::Finished
        }
    }

    fn name(&self) -> &str {
        "HarshStop"
    }
}
