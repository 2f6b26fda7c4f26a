//! The movement system: request intake and per-tick execution

use crate::actor::{ActorBindings, MovementActor, MovementUpdateContext};
use crate::adapter::{MovementActorAdapter, MovementActorCallbacks};
use crate::block::{CustomNavigationBlockFactory, MovementBlock};
use crate::config::MovementConfig;
use crate::error::{MovementError, Result};
use crate::id::{EntityId, MovementRequestId, RequestIdGenerator};
use crate::path::{MovementPath, OffMeshLinkData};
use crate::planner::PlannerStatus;
use crate::request::{
    FailureReason, MovementRequest, MovementRequestCallback, MovementRequestResult,
    MovementRequestStatus,
};
use crate::style::MovementStyle;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Owns every registered actor and every queued request.
///
/// Each actor works through its requests in FIFO order, one at a time.
/// Call [`MovementSystem::update`] once per simulation tick.
pub struct MovementSystem {
    actors: HashMap<EntityId, MovementActor>,
    requests: HashMap<MovementRequestId, MovementRequest>,
    request_ids: RequestIdGenerator,
    custom_navigation_block_factory: Option<CustomNavigationBlockFactory>,
    config: MovementConfig,
    resets: u64,
}

impl MovementSystem {
    /// Create a system with the default configuration
    pub fn new() -> Self {
        Self {
            actors: HashMap::new(),
            requests: HashMap::new(),
            request_ids: RequestIdGenerator::new(),
            custom_navigation_block_factory: None,
            config: MovementConfig::default(),
            resets: 0,
        }
    }

    /// Create a system with a validated configuration
    pub fn with_config(config: MovementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Register an entity, or replace the collaborators of a registered one
    pub fn register_entity(
        &mut self,
        entity_id: EntityId,
        callbacks: Box<dyn MovementActorCallbacks>,
        adapter: Box<dyn MovementActorAdapter>,
    ) {
        match self.actors.entry(entity_id) {
            Entry::Occupied(entry) => {
                let bindings = &mut entry.into_mut().bindings;
                bindings.callbacks = callbacks;
                bindings.adapter = adapter;
            }
            Entry::Vacant(entry) => {
                entry.insert(MovementActor::new(
                    entity_id,
                    ActorBindings::new(callbacks, adapter),
                ));
                log::debug!("Registered entity {} for movement", entity_id);
            }
        }
    }

    /// Remove an entity and forget its requests without notifying anyone.
    ///
    /// Returns false if the entity was not registered.
    pub fn unregister_entity(&mut self, entity_id: EntityId) -> bool {
        let Some(mut actor) = self.actors.remove(&entity_id) else {
            return false;
        };

        actor.planner.clear(&mut actor.bindings);
        for request_id in &actor.request_queue {
            self.requests.remove(request_id);
        }

        log::debug!("Unregistered entity {} from movement", entity_id);
        true
    }

    pub fn is_registered(&self, entity_id: EntityId) -> bool {
        self.actors.contains_key(&entity_id)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Read-only view of a registered actor
    pub fn actor(&self, entity_id: EntityId) -> Option<&MovementActor> {
        self.actors.get(&entity_id)
    }

    /// Queue a request behind the entity's other requests
    pub fn try_queue_request(&mut self, request: MovementRequest) -> Result<MovementRequestId> {
        let Some(actor) = self.actors.get_mut(&request.entity_id) else {
            log::warn!(
                "Movement request for unregistered entity {} ignored",
                request.entity_id
            );
            return Err(MovementError::ActorNotRegistered(request.entity_id));
        };

        let request_id = self.request_ids.next();
        actor.request_queue.push_back(request_id);
        log::debug!(
            "Queued movement request {} for entity {}",
            request_id,
            request.entity_id
        );
        self.requests.insert(request_id, request);
        Ok(request_id)
    }

    /// Queue a request, returning [`MovementRequestId::INVALID`] if the
    /// entity is not registered
    pub fn queue_request(&mut self, request: MovementRequest) -> MovementRequestId {
        self.try_queue_request(request)
            .unwrap_or(MovementRequestId::INVALID)
    }

    /// Drop a request. Its callback is never invoked.
    ///
    /// Cancelling the request the planner is working on does not stop the
    /// agent; it keeps executing its plan until another request replaces it.
    pub fn cancel_request(&mut self, request_id: MovementRequestId) -> Result<()> {
        let request = self
            .requests
            .remove(&request_id)
            .ok_or(MovementError::UnknownRequest(request_id))?;

        if let Some(actor) = self.actors.get_mut(&request.entity_id) {
            if actor.request_id_currently_in_planner == Some(request_id) {
                actor.planner.cancel_current_request(&mut actor.bindings);
            }
            actor.remove_request(request_id);
        }

        log::debug!("Canceled movement request {}", request_id);
        Ok(())
    }

    /// Where a request currently is
    pub fn get_request_status(&self, request_id: MovementRequestId) -> MovementRequestStatus {
        let actor = self
            .requests
            .get(&request_id)
            .and_then(|request| self.actors.get(&request.entity_id));

        match actor {
            Some(actor) if actor.request_id_currently_in_planner == Some(request_id) => {
                actor.planner.status()
            }
            Some(actor) if actor.request_queue.contains(&request_id) => {
                MovementRequestStatus::Queued
            }
            _ => MovementRequestStatus::NotQueued,
        }
    }

    /// Set the constructor for blocks traversing custom navigation links
    pub fn register_custom_navigation_block_factory<F>(&mut self, factory: F)
    where
        F: Fn(&MovementPath, &OffMeshLinkData, &MovementStyle) -> Box<dyn MovementBlock> + 'static,
    {
        self.custom_navigation_block_factory = Some(Box::new(factory));
    }

    /// Drop every actor and request without invoking any callback
    pub fn reset(&mut self) {
        for actor in self.actors.values_mut() {
            actor.planner.clear(&mut actor.bindings);
        }
        self.actors.clear();
        self.requests.clear();
        self.resets += 1;
    }

    /// Advance every actor by `frame_time` seconds.
    ///
    /// Completion callbacks run after all actors have been updated. A
    /// callback that resets the system cancels the callbacks still pending
    /// for this tick.
    pub fn update(&mut self, frame_time: f32) {
        let mut finished: Vec<(MovementRequestResult, Option<MovementRequestCallback>)> =
            Vec::new();

        let Self {
            actors,
            requests,
            config,
            custom_navigation_block_factory,
            ..
        } = &mut *self;

        for actor in actors.values_mut() {
            let MovementActor {
                entity_id,
                bindings,
                planner,
                request_queue,
                request_id_currently_in_planner,
            } = actor;

            if bindings.path_follower().is_none() {
                continue;
            }

            let mut context = MovementUpdateContext {
                entity_id: *entity_id,
                actor: bindings,
                config: &*config,
                custom_navigation_block_factory: custom_navigation_block_factory.as_ref(),
                frame_time,
            };

            if planner.is_ready_for_new_request() {
                if let Some(&front) = request_queue.front() {
                    if *request_id_currently_in_planner != Some(front) {
                        if let Some(request) = requests.get(&front) {
                            planner.start_working_on_request(request, &mut context);
                            *request_id_currently_in_planner = Some(front);
                        }
                    }
                }
            }

            if !planner.is_update_needed() {
                continue;
            }

            let status = planner.update(&mut context);
            let Some(result) = request_result(status, *request_id_currently_in_planner) else {
                continue;
            };
            if request_queue.front() != Some(&result.request_id) {
                continue;
            }

            request_queue.pop_front();
            *request_id_currently_in_planner = None;
            let callback = requests
                .remove(&result.request_id)
                .and_then(|request| request.callback);
            finished.push((result, callback));
        }

        let resets = self.resets;
        for (result, callback) in finished {
            if self.resets != resets {
                break;
            }
            log::debug!(
                "Movement request {} finished: {:?}",
                result.request_id,
                result.outcome
            );
            if let Some(callback) = callback {
                callback(&result, self);
            }
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a terminal planner status onto the result of the request in the
/// planner
fn request_result(
    status: PlannerStatus,
    request_id: Option<MovementRequestId>,
) -> Option<MovementRequestResult> {
    let request_id = request_id?;
    let reason = match status {
        PlannerStatus::Working => return None,
        PlannerStatus::RequestSatisfied => return Some(MovementRequestResult::success(request_id)),
        PlannerStatus::PathfinderFailed => FailureReason::CouldNotFindPathToRequestedDestination,
        PlannerStatus::MovingAlongPathFailed => {
            FailureReason::CouldNotMoveAlongDesignerDesignedPath
        }
        PlannerStatus::ReachedMaxAllowedReplans => {
            FailureReason::FailedToProduceSuccessfulPlanAfterMaximumNumberOfAttempts
        }
    };
    Some(MovementRequestResult::failure(request_id, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathfinderState;
    use crate::request::RequestOutcome;
    use crate::test_support::{FakeAdapter, FakeWorld, SharedWorld};
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn register(system: &mut MovementSystem, entity_id: EntityId, world: &SharedWorld) {
        let bindings = crate::test_support::bindings(world);
        system.register_entity(entity_id, bindings.callbacks, bindings.adapter);
    }

    fn straight_path() -> MovementPath {
        MovementPath::from_positions([Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)])
    }

    #[test]
    fn test_queue_for_unregistered_entity() {
        let mut system = MovementSystem::new();
        let id = system.queue_request(MovementRequest::move_to(EntityId(9), Vec3::X));
        assert!(!id.is_valid());

        let err = system
            .try_queue_request(MovementRequest::stop(EntityId(9)))
            .unwrap_err();
        assert!(matches!(err, MovementError::ActorNotRegistered(EntityId(9))));
    }

    #[test]
    fn test_register_is_idempotent() {
        let world = FakeWorld::shared();
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);

        let first = system.queue_request(MovementRequest::move_to(EntityId(1), Vec3::X));
        register(&mut system, EntityId(1), &world);

        assert_eq!(system.actor_count(), 1);
        let actor = system.actor(EntityId(1)).unwrap();
        assert_eq!(actor.request_queue().len(), 1);
        assert_eq!(actor.request_queue().front(), Some(&first));
    }

    #[test]
    fn test_reregistration_replaces_adapter() {
        let world = FakeWorld::shared();
        let other = FakeWorld::shared();
        other.borrow_mut().velocity = Vec3::new(2.0, 0.0, 0.0);

        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);
        let bindings = crate::test_support::bindings(&world);
        system.register_entity(
            EntityId(1),
            bindings.callbacks,
            Box::new(FakeAdapter(other.clone())),
        );

        system.queue_request(MovementRequest::stop(EntityId(1)));
        system.update(0.1);
        assert_eq!(world.borrow().movement_clears, 0);
        assert_eq!(other.borrow().movement_clears, 2);
    }

    #[test]
    fn test_request_ids_are_unique_and_valid() {
        let world = FakeWorld::shared();
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);

        let a = system.queue_request(MovementRequest::move_to(EntityId(1), Vec3::X));
        let b = system.queue_request(MovementRequest::move_to(EntityId(1), Vec3::Y));
        assert!(a.is_valid());
        assert!(b.is_valid());
        assert_ne!(a, b);
    }

    #[test]
    fn test_status_progression() {
        let world = FakeWorld::shared();
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);

        let first = system.queue_request(MovementRequest::move_to(EntityId(1), Vec3::X));
        let second = system.queue_request(MovementRequest::move_to(EntityId(1), Vec3::Y));
        assert_eq!(system.get_request_status(first), MovementRequestStatus::Queued);

        system.update(0.1);
        assert_eq!(
            system.get_request_status(first),
            MovementRequestStatus::FindingPath
        );
        assert_eq!(system.get_request_status(second), MovementRequestStatus::Queued);

        {
            let mut world = world.borrow_mut();
            world.pathfinder_state = PathfinderState::FoundPath;
            world.found_path = Some(straight_path());
        }
        system.update(0.1);
        assert_eq!(
            system.get_request_status(first).to_string(),
            "Executing plan: [FollowPath]"
        );
        assert_eq!(
            system.get_request_status(MovementRequestId::INVALID),
            MovementRequestStatus::NotQueued
        );
    }

    #[test]
    fn test_cancel_queued_request_is_silent() {
        let world = FakeWorld::shared();
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);

        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let id = system.queue_request(
            MovementRequest::move_to(EntityId(1), Vec3::X)
                .with_callback(move |_, _| *counter.borrow_mut() += 1),
        );

        assert!(system.cancel_request(id).is_ok());
        assert_eq!(system.get_request_status(id), MovementRequestStatus::NotQueued);
        assert!(system.actor(EntityId(1)).unwrap().request_queue().is_empty());
        assert!(matches!(
            system.cancel_request(id),
            Err(MovementError::UnknownRequest(_))
        ));

        system.update(0.1);
        assert_eq!(*calls.borrow(), 0);
        assert!(world.borrow().path_requests.is_empty());
    }

    #[test]
    fn test_cancel_does_not_stop_motion() {
        let world = FakeWorld::shared();
        {
            let mut world = world.borrow_mut();
            world.pathfinder_state = PathfinderState::FoundPath;
            world.found_path = Some(straight_path());
        }
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);

        let id = system.queue_request(MovementRequest::move_to(EntityId(1), Vec3::X));
        system.update(0.1);
        let attached = world.borrow().attached_paths.len();
        let updates = world.borrow().follower_updates;

        system.cancel_request(id).unwrap();
        let actor = system.actor(EntityId(1)).unwrap();
        assert_eq!(actor.request_id_currently_in_planner(), None);
        assert_eq!(actor.planner().status().to_string(), "Executing plan: [FollowPath]");

        system.update(0.1);
        assert_eq!(world.borrow().attached_paths.len(), attached);
        assert_eq!(world.borrow().follower_updates, updates + 1);
    }

    #[test]
    fn test_actor_without_path_follower_is_skipped() {
        let world = FakeWorld::shared();
        world.borrow_mut().has_path_follower = false;
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);

        let id = system.queue_request(MovementRequest::move_to(EntityId(1), Vec3::X));
        system.update(0.1);
        assert_eq!(system.get_request_status(id), MovementRequestStatus::Queued);
        assert!(world.borrow().path_requests.is_empty());
    }

    #[test]
    fn test_callback_can_queue_follow_up() {
        let world = FakeWorld::shared();
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);

        let follow_up = Rc::new(RefCell::new(None));
        let slot = follow_up.clone();
        system.queue_request(MovementRequest::stop(EntityId(1)).with_callback(
            move |result, system| {
                assert_eq!(result.outcome, RequestOutcome::Success);
                let id = system.queue_request(MovementRequest::stop(EntityId(1)));
                *slot.borrow_mut() = Some(id);
            },
        ));

        system.update(0.1);
        let id = follow_up.borrow().expect("callback should have run");
        assert_eq!(system.get_request_status(id), MovementRequestStatus::Queued);

        system.update(0.1);
        assert_eq!(system.get_request_status(id), MovementRequestStatus::NotQueued);
    }

    #[test]
    fn test_unregister_ends_running_block_silently() {
        let world = FakeWorld::shared();
        {
            let mut world = world.borrow_mut();
            world.pathfinder_state = PathfinderState::FoundPath;
            world.found_path = Some(straight_path());
            world.body_direction = Vec3::NEG_X;
        }
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);

        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut style = MovementStyle::default();
        style.set_turn_towards_movement_direction_before_moving(true);
        let id = system.queue_request(
            MovementRequest::move_to(EntityId(1), Vec3::X)
                .with_style(style)
                .with_callback(move |_, _| *counter.borrow_mut() += 1),
        );
        system.update(0.1);

        assert!(system.unregister_entity(EntityId(1)));
        assert!(!system.unregister_entity(EntityId(1)));
        assert_eq!(world.borrow().body_target_resets, 1);
        assert_eq!(system.get_request_status(id), MovementRequestStatus::NotQueued);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_reset_drops_everything_without_callbacks() {
        let world = FakeWorld::shared();
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);
        register(&mut system, EntityId(2), &world);

        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let id = system.queue_request(
            MovementRequest::move_to(EntityId(1), Vec3::X)
                .with_callback(move |_, _| *counter.borrow_mut() += 1),
        );
        system.update(0.1);

        system.reset();
        assert_eq!(system.actor_count(), 0);
        assert_eq!(system.get_request_status(id), MovementRequestStatus::NotQueued);

        system.update(0.1);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_reset_from_callback_skips_pending_callbacks() {
        let world = FakeWorld::shared();
        let mut system = MovementSystem::new();
        register(&mut system, EntityId(1), &world);
        register(&mut system, EntityId(2), &world);

        let calls = Rc::new(RefCell::new(0));
        for entity_id in [EntityId(1), EntityId(2)] {
            let counter = calls.clone();
            system.queue_request(MovementRequest::stop(entity_id).with_callback(
                move |_, system| {
                    *counter.borrow_mut() += 1;
                    system.reset();
                },
            ));
        }

        system.update(0.1);
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(system.actor_count(), 0);
    }

    #[test]
    fn test_with_config_validates() {
        let config = MovementConfig::default().with_stuck_time(-1.0);
        assert!(matches!(
            MovementSystem::with_config(config),
            Err(MovementError::InvalidConfig(_))
        ));
        assert!(MovementSystem::with_config(MovementConfig::default()).is_ok());
    }
}
