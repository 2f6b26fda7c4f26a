//! Movement blocks: the primitive units a plan is made of
//!
//! A block is begun once when it becomes the plan's current block, updated
//! once per tick while it stays current, and ended once when it stops being
//! current, whether it finished, failed, or the plan was discarded.

mod cover;
mod default_empty;
mod exact_positioning;
mod follow_path;
mod harsh_stop;
mod turn_towards_position;

pub use cover::{InstallAgentInCover, SetupActorCoverInformation, UninstallAgentFromCover};
pub use default_empty::DefaultEmpty;
pub use exact_positioning::{
    ExactPositioning, PositioningKind, SmartObjectUse, TraversalTrigger, UpcomingPath,
    UseExactPositioning, UseExactPositioningBase, UseSmartObject,
};
pub use follow_path::FollowPath;
pub use harsh_stop::HarshStop;
pub use turn_towards_position::TurnTowardsPosition;

use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::path::{MovementPath, OffMeshLinkData};
use crate::style::MovementStyle;
use serde::{Deserialize, Serialize};

/// Result of updating a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockStatus {
    /// Keep updating this block
    Running,
    /// Advance to the next block
    Finished,
    /// The block failed; the planner decides whether to re-plan
    CantBeFinished,
}

/// One bounded unit of movement behavior
pub trait MovementBlock {
    /// Called once before the first update
    fn begin(&mut self, _actor: &mut ActorBindings) {}

    /// Called once per tick while the block is current
    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus;

    /// Called once when the block stops being current
    fn end(&mut self, _actor: &mut ActorBindings) {}

    /// Whether the plan may be discarded while this block runs
    fn interruptible_now(&self) -> bool {
        true
    }

    /// Diagnostic name
    fn name(&self) -> &str;
}

/// Game-supplied constructor for the blocks that traverse custom
/// navigation links
pub type CustomNavigationBlockFactory =
    Box<dyn Fn(&MovementPath, &OffMeshLinkData, &MovementStyle) -> Box<dyn MovementBlock>>;
