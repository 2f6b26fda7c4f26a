//! Planners turn movement requests into plans and supervise them
//!
//! The generic planner cycles through three phases:
//!
//! ```text
//! Idle ──request──> PathfindingQueued ──path found──> ExecutingPlan
//!                         ^                               │
//!                         └────── plan failed (replan) ───┘
//! ```
//!
//! Stop requests and designer paths skip the path-find and produce their
//! plan directly.

use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::block::{
    DefaultEmpty, FollowPath, HarshStop, InstallAgentInCover, MovementBlock,
    SetupActorCoverInformation, TurnTowardsPosition, UninstallAgentFromCover,
    UseExactPositioning, UseSmartObject,
};
use crate::helpers::flat_distance;
use crate::path::{MovementPath, NavigationType, PathPoint, PathfinderState};
use crate::plan::{Plan, PlanStatus};
use crate::request::{MovementRequest, MovementRequestStatus};
use crate::style::MovementStyle;

/// Automatic re-plans allowed per request before giving up
pub const MAX_ALLOWED_REPLANS: u32 = 3;

/// Distance before a link or exact position at which path following hands
/// over to the traversal block
pub const END_DISTANCE_BEFORE_TRAVERSAL: f32 = 2.5;

/// What the planner reports after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerStatus {
    Working,
    RequestSatisfied,
    PathfinderFailed,
    MovingAlongPathFailed,
    ReachedMaxAllowedReplans,
}

impl PlannerStatus {
    /// Whether the request the planner worked on has reached its outcome
    pub fn is_terminal(self) -> bool {
        self != PlannerStatus::Working
    }
}

/// Per-actor request processor
pub trait Planner {
    /// Whether the planner has anything to do this tick
    fn is_update_needed(&self) -> bool;

    /// Start on a request. Only valid while [`Planner::is_ready_for_new_request`].
    fn start_working_on_request(
        &mut self,
        request: &MovementRequest,
        context: &mut MovementUpdateContext<'_>,
    );

    /// Forget about the current request.
    ///
    /// The agent keeps executing its current plan until another request
    /// replaces it.
    fn cancel_current_request(&mut self, _actor: &mut ActorBindings) {}

    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> PlannerStatus;

    fn is_ready_for_new_request(&self) -> bool;

    /// Diagnostic status of the request being worked on
    fn status(&self) -> MovementRequestStatus;

    /// Drop the plan and the request without reporting anything
    fn clear(&mut self, actor: &mut ActorBindings);
}

/// Path-finding planner used by every actor by default
#[derive(Default)]
pub struct GenericPlanner {
    plan: Plan,
    request: Option<MovementRequest>,
    pathfinder_request_queued: bool,
    replanning_attempts: u32,
    pending_status: Option<PlannerStatus>,
}

impl GenericPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn replanning_attempts(&self) -> u32 {
        self.replanning_attempts
    }

    pub fn is_pathfinder_request_queued(&self) -> bool {
        self.pathfinder_request_queued
    }

    fn start_planning(&mut self, request: MovementRequest, context: &mut MovementUpdateContext<'_>) {
        self.pending_status = None;

        if request.is_stop() {
            self.install_plan(produce_stop_plan(), context.actor);
        } else if request.style.is_moving_along_designed_path() {
            match context.actor.adapter.designed_path() {
                Some(path) => {
                    let follow = FollowPath::new(path, 0.0, request.style.clone(), false);
                    self.install_plan(vec![Box::new(follow)], context.actor);
                }
                None => {
                    log::error!(
                        "Entity {} was asked to follow a designer path but has none",
                        context.entity_id
                    );
                    self.pending_status = Some(PlannerStatus::MovingAlongPathFailed);
                }
            }
        } else {
            let start = context.actor.adapter.physics_position();
            context
                .actor
                .callbacks
                .queue_path_request(&request.pathfind_request(start));
            self.pathfinder_request_queued = true;
            self.plan.cut_off_after_current_block();
        }

        self.request = Some(request);
    }

    /// Replace the plan if possible, otherwise queue the blocks behind the
    /// running one
    fn install_plan(&mut self, blocks: Vec<Box<dyn MovementBlock>>, actor: &mut ActorBindings) {
        if self.plan.interruptible_now() {
            self.plan.clear(actor);
        } else {
            self.plan.cut_off_after_current_block();
        }
        for block in blocks {
            self.plan.add_block(block);
        }
    }

    fn finish_request(&mut self, actor: &mut ActorBindings) {
        self.plan.clear(actor);
        self.request = None;
        self.pathfinder_request_queued = false;
        self.pending_status = None;
    }

    /// Returns a terminal status when the path-find failed
    fn poll_pathfinder(&mut self, context: &mut MovementUpdateContext<'_>) -> Option<PlannerStatus> {
        match context.actor.callbacks.pathfinder_state() {
            PathfinderState::StillFinding => None,
            PathfinderState::CouldNotFindPath => {
                self.pathfinder_request_queued = false;
                self.finish_request(context.actor);
                Some(PlannerStatus::PathfinderFailed)
            }
            PathfinderState::FoundPath => {
                self.pathfinder_request_queued = false;
                let Some(path) = context.actor.callbacks.found_path() else {
                    log::error!(
                        "Pathfinder reported a path for entity {} but provided none",
                        context.entity_id
                    );
                    self.finish_request(context.actor);
                    return Some(PlannerStatus::PathfinderFailed);
                };

                let style = self
                    .request
                    .as_ref()
                    .map(|request| request.style.clone())
                    .unwrap_or_default();
                let blocks = produce_move_to_plan(&path, &style, context);
                self.install_plan(blocks, context.actor);

                log::debug!(
                    "Entity {} movement plan: {}",
                    context.entity_id,
                    self.plan.block_names().join(" > ")
                );
                context.actor.adapter.on_movement_plan_produced();
                None
            }
        }
    }

    fn handle_plan_failure(&mut self, context: &mut MovementUpdateContext<'_>) -> PlannerStatus {
        let Some(request) = self.request.take() else {
            self.plan.clear(context.actor);
            return PlannerStatus::Working;
        };

        self.replanning_attempts += 1;

        if request.style.is_moving_along_designed_path() {
            self.finish_request(context.actor);
            return PlannerStatus::MovingAlongPathFailed;
        }

        if self.replanning_attempts <= MAX_ALLOWED_REPLANS && self.plan.interruptible_now() {
            log::info!(
                "Entity {} could not finish its movement plan, re-planning (attempt {}/{})",
                context.entity_id,
                self.replanning_attempts,
                MAX_ALLOWED_REPLANS
            );
            self.plan.clear(context.actor);
            self.start_planning(request, context);
            return PlannerStatus::Working;
        }

        self.finish_request(context.actor);
        PlannerStatus::ReachedMaxAllowedReplans
    }
}

impl Planner for GenericPlanner {
    fn is_update_needed(&self) -> bool {
        self.plan.has_blocks() || self.pathfinder_request_queued || self.pending_status.is_some()
    }

    fn start_working_on_request(
        &mut self,
        request: &MovementRequest,
        context: &mut MovementUpdateContext<'_>,
    ) {
        self.replanning_attempts = 0;
        self.start_planning(request.clone(), context);
    }

    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> PlannerStatus {
        if let Some(status) = self.pending_status.take() {
            self.finish_request(context.actor);
            return status;
        }

        if self.pathfinder_request_queued {
            if let Some(status) = self.poll_pathfinder(context) {
                return status;
            }
        }

        if self.pathfinder_request_queued {
            // Leftover of the previous plan; its outcome belongs to nobody
            if self.plan.has_blocks() && self.plan.execute(context) != PlanStatus::Running {
                self.plan.clear(context.actor);
            }
            return PlannerStatus::Working;
        }

        if self.request.is_none() {
            self.plan.clear(context.actor);
            return PlannerStatus::Working;
        }

        match self.plan.execute(context) {
            PlanStatus::Running => PlannerStatus::Working,
            PlanStatus::Finished => {
                self.finish_request(context.actor);
                PlannerStatus::RequestSatisfied
            }
            PlanStatus::CantBeFinished => self.handle_plan_failure(context),
        }
    }

    fn is_ready_for_new_request(&self) -> bool {
        !self.pathfinder_request_queued && self.plan.interruptible_now()
    }

    fn status(&self) -> MovementRequestStatus {
        if self.pathfinder_request_queued {
            MovementRequestStatus::FindingPath
        } else {
            MovementRequestStatus::ExecutingPlan(self.plan.snapshot())
        }
    }

    fn clear(&mut self, actor: &mut ActorBindings) {
        self.finish_request(actor);
        self.replanning_attempts = 0;
    }
}

/// Build the blocks that move an agent along a found path
pub(crate) fn produce_move_to_plan(
    path: &MovementPath,
    style: &MovementStyle,
    context: &mut MovementUpdateContext<'_>,
) -> Vec<Box<dyn MovementBlock>> {
    let mut blocks: Vec<Box<dyn MovementBlock>> = Vec::new();
    if path.len() < 2 {
        return blocks;
    }

    let actor = &mut *context.actor;
    let position = actor.adapter.physics_position();

    if style.should_turn_towards_movement_direction_before_moving()
        && !actor.last_point_was_smart_object
    {
        let turn_target = path
            .points()
            .iter()
            .map(|point| point.position)
            .find(|target| flat_distance(position, *target) > context.config.minimum_turn_offset);
        if let Some(target) = turn_target {
            blocks.push(Box::new(HarshStop::new()));
            blocks.push(Box::new(TurnTowardsPosition::new(target)));
        }
    }

    if actor.adapter.is_in_cover() {
        blocks.push(Box::new(UninstallAgentFromCover::new(style.stance)));
    }

    if style.is_moving_to_cover() {
        blocks.push(Box::new(SetupActorCoverInformation::new()));
    }

    let mut run = MovementPath::new();
    let mut pending_smart_object: Option<UseSmartObject> = None;

    for point in path.points() {
        run.push(point.clone());

        let Some(link) = point.off_mesh_link.as_ref().filter(|_| point.is_link()) else {
            continue;
        };

        let approach = std::mem::take(&mut run);
        push_run(
            &mut blocks,
            &mut pending_smart_object,
            &approach,
            style,
            END_DISTANCE_BEFORE_TRAVERSAL,
            false,
        );

        match point.navigation_type {
            NavigationType::SmartObject => {
                pending_smart_object =
                    Some(UseSmartObject::new(approach, style.clone(), link.clone()));
            }
            NavigationType::CustomNavigation => match context.custom_navigation_block_factory {
                Some(factory) => blocks.push(factory(&approach, link, style)),
                None => {
                    log::error!(
                        "No block factory registered for custom navigation link {}",
                        link.link_id
                    );
                    blocks.push(Box::new(DefaultEmpty::new()));
                }
            },
            NavigationType::Normal => {}
        }

        run.push(PathPoint::new(link.exit));
    }

    let exact_positioning = style.exact_positioning_request().cloned();
    let end_distance = if exact_positioning.is_some() {
        END_DISTANCE_BEFORE_TRAVERSAL
    } else {
        0.0
    };
    push_run(
        &mut blocks,
        &mut pending_smart_object,
        &run,
        style,
        end_distance,
        style.is_moving_to_cover(),
    );

    if let Some(request) = exact_positioning {
        blocks.push(Box::new(UseExactPositioning::new(run, style.clone(), request)));
    }

    if style.is_moving_to_cover() {
        blocks.push(Box::new(InstallAgentInCover::new()));
    }

    actor.last_point_was_smart_object = path
        .destination()
        .map_or(false, |point| point.navigation_type == NavigationType::SmartObject);

    blocks
}

/// Emit the follow block of a finished run, handing the run to the smart
/// object traversal that precedes it
fn push_run(
    blocks: &mut Vec<Box<dyn MovementBlock>>,
    pending_smart_object: &mut Option<UseSmartObject>,
    run: &MovementPath,
    style: &MovementStyle,
    end_distance: f32,
    ends_in_cover: bool,
) {
    if let Some(mut smart_object) = pending_smart_object.take() {
        smart_object.set_upcoming_path(run.clone(), style.clone());
        blocks.push(Box::new(smart_object));
    }

    if run.len() >= 2 {
        blocks.push(Box::new(FollowPath::new(
            run.clone(),
            end_distance,
            style.clone(),
            ends_in_cover,
        )));
    }
}

/// Build the blocks that stop an agent
pub(crate) fn produce_stop_plan() -> Vec<Box<dyn MovementBlock>> {
    vec![Box::new(HarshStop::new())]
}
