//! Exact positioning: approach a point, then hand over to an animation
//!
//! The block runs in two phases. While preparing it follows the approach
//! path and asks the positioning kind to trigger the traversal. Once the
//! actor target phase reports the animation has started it waits for the
//! animation to complete, and cannot be interrupted while doing so.

use super::{BlockStatus, MovementBlock};
use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::adapter::ActorTargetPhase;
use crate::helpers::{attach_path, flat_direction, path_follower_params, update_path_following};
use crate::path::{MovementPath, OffMeshLinkData};
use crate::style::{ExactPositioningRequest, MovementStyle};

/// Outcome of an attempt to trigger the traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalTrigger {
    /// Not in position yet, keep approaching
    StillTrying,
    /// The positioning request has been handed to the animation system
    Triggered,
    /// The traversal can never be triggered
    CouldNotTrigger,
}

/// What kind of exact positioning a [`UseExactPositioningBase`] performs
pub trait PositioningKind {
    fn name(&self) -> &str;

    /// Called every prepare tick until it stops returning `StillTrying`
    fn try_to_trigger_traversal(
        &mut self,
        context: &mut MovementUpdateContext<'_>,
        distance_to_end: f32,
    ) -> TraversalTrigger;

    /// Called once when the animation reports it has started
    fn on_traverse_started(&mut self, _actor: &mut ActorBindings) {}

    /// Recover from the actor target phase reporting an error
    fn handle_exact_positioning_error(&mut self, context: &mut MovementUpdateContext<'_>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PositioningState {
    Prepare,
    Traverse,
}

/// Two-phase exact positioning block over a [`PositioningKind`]
pub struct UseExactPositioningBase<K: PositioningKind> {
    path: MovementPath,
    style: MovementStyle,
    state: PositioningState,
    traversal_triggered: bool,
    kind: K,
}

impl<K: PositioningKind> UseExactPositioningBase<K> {
    pub fn with_kind(path: MovementPath, style: MovementStyle, kind: K) -> Self {
        Self {
            path,
            style,
            state: PositioningState::Prepare,
            traversal_triggered: false,
            kind,
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Path used to approach the positioning point
    pub fn path(&self) -> &MovementPath {
        &self.path
    }

    pub fn is_traversing(&self) -> bool {
        self.state == PositioningState::Traverse
    }

    fn update_prepare(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        let phase = context.actor.adapter.actor_target_phase();

        if phase == ActorTargetPhase::Error {
            self.kind.handle_exact_positioning_error(context);
            return BlockStatus::Finished;
        }

        if self.traversal_triggered && phase.has_started() {
            self.state = PositioningState::Traverse;
            self.kind.on_traverse_started(context.actor);
            return BlockStatus::Running;
        }

        let Some(step) = update_path_following(context) else {
            return BlockStatus::CantBeFinished;
        };

        if !self.traversal_triggered {
            match self.kind.try_to_trigger_traversal(context, step.distance_to_end) {
                TraversalTrigger::StillTrying => {}
                TraversalTrigger::Triggered => self.traversal_triggered = true,
                TraversalTrigger::CouldNotTrigger => return BlockStatus::CantBeFinished,
            }
        }

        BlockStatus::Running
    }

    fn update_traverse(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        match context.actor.adapter.actor_target_phase() {
            ActorTargetPhase::None | ActorTargetPhase::StartedAndFinished => BlockStatus::Finished,
            _ => BlockStatus::Running,
        }
    }
}

impl<K: PositioningKind> MovementBlock for UseExactPositioningBase<K> {
    fn begin(&mut self, actor: &mut ActorBindings) {
        self.state = PositioningState::Prepare;
        self.traversal_triggered = false;

        let params = path_follower_params(&self.style, 0.0, false);
        attach_path(actor, &self.path, &self.style, &params);
    }

    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        match self.state {
            PositioningState::Prepare => self.update_prepare(context),
            PositioningState::Traverse => self.update_traverse(context),
        }
    }

    fn end(&mut self, actor: &mut ActorBindings) {
        if self.traversal_triggered {
            actor.adapter.reset_actor_target_request();
        }
    }

    fn interruptible_now(&self) -> bool {
        self.state != PositioningState::Traverse
    }

    fn name(&self) -> &str {
        self.kind.name()
    }
}

/// Plays an action at an exact position and orientation
#[derive(Debug, Clone)]
pub struct ExactPositioning {
    request: ExactPositioningRequest,
}

impl PositioningKind for ExactPositioning {
    fn name(&self) -> &str {
        "UseExactPositioning"
    }

    fn try_to_trigger_traversal(
        &mut self,
        context: &mut MovementUpdateContext<'_>,
        _distance_to_end: f32,
    ) -> TraversalTrigger {
        context.actor.adapter.request_exact_position(&self.request);
        TraversalTrigger::Triggered
    }

    fn handle_exact_positioning_error(&mut self, context: &mut MovementUpdateContext<'_>) {
        log::warn!(
            "Entity {} failed to reach exact position {} for '{}', teleporting",
            context.entity_id,
            self.request.position,
            self.request.action
        );
        context
            .actor
            .adapter
            .teleport(self.request.position, self.request.direction);
    }
}

/// Generic exact positioning at the end of a path
pub type UseExactPositioning = UseExactPositioningBase<ExactPositioning>;

impl UseExactPositioningBase<ExactPositioning> {
    pub fn new(path: MovementPath, style: MovementStyle, request: ExactPositioningRequest) -> Self {
        Self::with_kind(path, style, ExactPositioning { request })
    }

    pub fn request(&self) -> &ExactPositioningRequest {
        &self.kind.request
    }
}

/// The movement that follows a smart object traversal
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingPath {
    pub path: MovementPath,
    pub style: MovementStyle,
}

/// Traverses a smart-object link
#[derive(Debug, Clone)]
pub struct SmartObjectUse {
    link: OffMeshLinkData,
    upcoming: Option<UpcomingPath>,
    time_spent_waiting: f32,
    wait_warning_logged: bool,
}

impl PositioningKind for SmartObjectUse {
    fn name(&self) -> &str {
        "UseSmartObject"
    }

    fn try_to_trigger_traversal(
        &mut self,
        context: &mut MovementUpdateContext<'_>,
        distance_to_end: f32,
    ) -> TraversalTrigger {
        if distance_to_end > context.config.smart_object_trigger_distance {
            return TraversalTrigger::StillTrying;
        }

        let adapter = &mut context.actor.adapter;
        if !adapter.is_closest_to_use_smart_object(&self.link) {
            self.time_spent_waiting += context.frame_time;
            if !self.wait_warning_logged
                && self.time_spent_waiting > context.config.smart_object_wait_warning_time
            {
                self.wait_warning_logged = true;
                log::warn!(
                    "Entity {} has waited {:.1}s to use smart object link {}",
                    context.entity_id,
                    self.time_spent_waiting,
                    self.link.link_id
                );
            }
            return TraversalTrigger::StillTrying;
        }

        if adapter.prepare_navigate_smart_object(&self.link) {
            TraversalTrigger::Triggered
        } else {
            adapter.invalidate_smart_object_link(&self.link);
            TraversalTrigger::CouldNotTrigger
        }
    }

    fn on_traverse_started(&mut self, actor: &mut ActorBindings) {
        if let Some(upcoming) = &self.upcoming {
            actor.adapter.set_actor_path(&upcoming.style, &upcoming.path);
        }
    }

    fn handle_exact_positioning_error(&mut self, context: &mut MovementUpdateContext<'_>) {
        log::warn!(
            "Entity {} failed to use smart object link {}, teleporting to its exit",
            context.entity_id,
            self.link.link_id
        );
        let direction = flat_direction(self.link.entry, self.link.exit);
        context.actor.adapter.teleport(self.link.exit, direction);
    }
}

/// Smart object traversal block
pub type UseSmartObject = UseExactPositioningBase<SmartObjectUse>;

impl UseExactPositioningBase<SmartObjectUse> {
    pub fn new(path: MovementPath, style: MovementStyle, link: OffMeshLinkData) -> Self {
        Self::with_kind(
            path,
            style,
            SmartObjectUse {
                link,
                upcoming: None,
                time_spent_waiting: 0.0,
                wait_warning_logged: false,
            },
        )
    }

    /// Hand over the movement that follows the traversal
    pub fn set_upcoming_path(&mut self, path: MovementPath, style: MovementStyle) {
        self.kind.upcoming = Some(UpcomingPath { path, style });
    }

    pub fn upcoming_path(&self) -> Option<&UpcomingPath> {
        self.kind.upcoming.as_ref()
    }

    pub fn link(&self) -> &OffMeshLinkData {
        &self.kind.link
    }

    /// Time spent waiting for the smart object to become free
    pub fn time_spent_waiting(&self) -> f32 {
        self.kind.time_spent_waiting
    }
}
