//! Per-agent movement state

use crate::adapter::{MovementActorAdapter, MovementActorCallbacks, PathFollower};
use crate::block::CustomNavigationBlockFactory;
use crate::config::MovementConfig;
use crate::id::{EntityId, MovementRequestId};
use crate::planner::{GenericPlanner, Planner};
use std::collections::VecDeque;

/// The collaborators of an agent plus the little state blocks share
pub struct ActorBindings {
    pub adapter: Box<dyn MovementActorAdapter>,
    pub callbacks: Box<dyn MovementActorCallbacks>,
    /// The last produced path ended in a smart-object link
    pub last_point_was_smart_object: bool,
}

impl ActorBindings {
    /// Create bindings for an agent
    pub fn new(
        callbacks: Box<dyn MovementActorCallbacks>,
        adapter: Box<dyn MovementActorAdapter>,
    ) -> Self {
        Self {
            adapter,
            callbacks,
            last_point_was_smart_object: false,
        }
    }

    /// Shortcut to the agent's path follower
    pub fn path_follower(&mut self) -> Option<&mut dyn PathFollower> {
        self.callbacks.path_follower()
    }
}

/// Everything a block or planner may touch during one update
pub struct MovementUpdateContext<'a> {
    pub entity_id: EntityId,
    pub actor: &'a mut ActorBindings,
    pub config: &'a MovementConfig,
    pub custom_navigation_block_factory: Option<&'a CustomNavigationBlockFactory>,
    /// Seconds elapsed since the previous update
    pub frame_time: f32,
}

/// A registered agent: its request queue, its planner and its bindings
pub struct MovementActor {
    pub(crate) entity_id: EntityId,
    pub(crate) bindings: ActorBindings,
    pub(crate) planner: Box<dyn Planner>,
    pub(crate) request_queue: VecDeque<MovementRequestId>,
    pub(crate) request_id_currently_in_planner: Option<MovementRequestId>,
}

impl MovementActor {
    /// Create an actor with the default planner
    pub fn new(entity_id: EntityId, bindings: ActorBindings) -> Self {
        Self::with_planner(entity_id, bindings, Box::new(GenericPlanner::new()))
    }

    /// Create an actor with a specific planner
    pub fn with_planner(
        entity_id: EntityId,
        bindings: ActorBindings,
        planner: Box<dyn Planner>,
    ) -> Self {
        Self {
            entity_id,
            bindings,
            planner,
            request_queue: VecDeque::new(),
            request_id_currently_in_planner: None,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Requests waiting for or being worked on by this actor, front first
    pub fn request_queue(&self) -> &VecDeque<MovementRequestId> {
        &self.request_queue
    }

    pub fn request_id_currently_in_planner(&self) -> Option<MovementRequestId> {
        self.request_id_currently_in_planner
    }

    pub fn planner(&self) -> &dyn Planner {
        self.planner.as_ref()
    }

    /// Whether the request at the front of the queue is the planner's
    pub(crate) fn is_planner_working_on_front_request(&self) -> bool {
        match (self.request_queue.front(), self.request_id_currently_in_planner) {
            (Some(front), Some(in_planner)) => *front == in_planner,
            _ => false,
        }
    }

    /// Drop a request from the queue wherever it is
    pub(crate) fn remove_request(&mut self, request_id: MovementRequestId) {
        self.request_queue.retain(|id| *id != request_id);
        if self.request_id_currently_in_planner == Some(request_id) {
            self.request_id_currently_in_planner = None;
        }
    }
}
