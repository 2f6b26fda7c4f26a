//! Blocks that toggle the agent's cover state

use super::{BlockStatus, MovementBlock};
use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::style::Stance;

/// Prepares the cover bookkeeping for a path that ends in cover
#[derive(Debug, Clone, Default)]
pub struct SetupActorCoverInformation;

impl SetupActorCoverInformation {
    pub fn new() -> Self {
        Self
    }
}

impl MovementBlock for SetupActorCoverInformation {
    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        context.actor.adapter.setup_cover_information();
        BlockStatus::Finished
    }

    fn name(&self) -> &str {
        "SetupActorCoverInformation"
    }
}

/// Marks the agent as being in cover
#[derive(Debug, Clone, Default)]
pub struct InstallAgentInCover;

impl InstallAgentInCover {
    pub fn new() -> Self {
        Self
    }
}

impl MovementBlock for InstallAgentInCover {
    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        context.actor.adapter.set_in_cover(true);
        BlockStatus::Finished
    }

    fn name(&self) -> &str {
        "InstallAgentInCover"
    }
}

/// Leaves cover, switching to the stance of the upcoming movement
#[derive(Debug, Clone)]
pub struct UninstallAgentFromCover {
    stance: Stance,
}

impl UninstallAgentFromCover {
    pub fn new(stance: Stance) -> Self {
        Self { stance }
    }

    pub fn stance(&self) -> Stance {
        self.stance
    }
}

impl MovementBlock for UninstallAgentFromCover {
    fn begin(&mut self, actor: &mut ActorBindings) {
        actor.adapter.set_in_cover(false);
        actor.adapter.set_stance(self.stance);
    }

    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        if context.actor.adapter.is_in_cover() {
            BlockStatus::Running
        } else {
            BlockStatus::Finished
        }
    }

    fn name(&self) -> &str {
        "UninstallAgentFromCover"
    }
}
