//! Shared-state fakes for unit tests

use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::adapter::{
    ActorTargetPhase, LookUpdate, MovementActorAdapter, MovementActorCallbacks, PathFollowResult,
    PathFollower, PathFollowerParams,
};
use crate::config::MovementConfig;
use crate::id::EntityId;
use crate::path::{MovementPath, OffMeshLinkData, PathfindRequest, PathfinderState};
use crate::style::{ExactPositioningRequest, MovementStyle, Stance};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type SharedWorld = Rc<RefCell<FakeWorld>>;

/// Everything the fakes report and record
pub(crate) struct FakeWorld {
    pub position: Vec3,
    pub velocity: Vec3,
    pub body_direction: Vec3,
    pub phase: ActorTargetPhase,
    pub in_cover: bool,
    pub stance: Option<Stance>,

    pub body_target: Option<Vec3>,
    pub body_target_resets: usize,
    pub movement_outputs: usize,
    pub movement_clears: usize,
    pub actor_paths: Vec<MovementPath>,
    pub cover_setups: usize,
    pub cover_updates: usize,
    pub looks: Vec<LookUpdate>,
    pub exact_position_requests: Vec<ExactPositioningRequest>,
    pub actor_target_resets: usize,
    pub smart_object_closest: bool,
    pub smart_object_prepare_succeeds: bool,
    pub prepared_links: Vec<u32>,
    pub invalidated_links: Vec<u32>,
    pub teleports: Vec<(Vec3, Vec3)>,
    pub designed_path: Option<MovementPath>,
    pub plans_produced: usize,

    pub pathfinder_state: PathfinderState,
    pub found_path: Option<MovementPath>,
    pub path_requests: Vec<PathfindRequest>,

    pub has_path_follower: bool,
    pub attached_paths: Vec<(MovementPath, PathFollowerParams)>,
    pub follow_result: PathFollowResult,
    pub distance_to_end: f32,
    pub follower_updates: usize,
    pub follower_resets: usize,
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            body_direction: Vec3::X,
            phase: ActorTargetPhase::None,
            in_cover: false,
            stance: None,
            body_target: None,
            body_target_resets: 0,
            movement_outputs: 0,
            movement_clears: 0,
            actor_paths: Vec::new(),
            cover_setups: 0,
            cover_updates: 0,
            looks: Vec::new(),
            exact_position_requests: Vec::new(),
            actor_target_resets: 0,
            smart_object_closest: true,
            smart_object_prepare_succeeds: true,
            prepared_links: Vec::new(),
            invalidated_links: Vec::new(),
            teleports: Vec::new(),
            designed_path: None,
            plans_produced: 0,
            pathfinder_state: PathfinderState::StillFinding,
            found_path: None,
            path_requests: Vec::new(),
            has_path_follower: true,
            attached_paths: Vec::new(),
            follow_result: PathFollowResult {
                target_reachable: true,
                ..Default::default()
            },
            distance_to_end: 10.0,
            follower_updates: 0,
            follower_resets: 0,
        }
    }
}

impl FakeWorld {
    pub fn shared() -> SharedWorld {
        Rc::new(RefCell::new(Self::default()))
    }
}

pub(crate) struct FakeAdapter(pub SharedWorld);

impl MovementActorAdapter for FakeAdapter {
    fn physics_position(&self) -> Vec3 {
        self.0.borrow().position
    }

    fn velocity(&self) -> Vec3 {
        self.0.borrow().velocity
    }

    fn move_direction(&self) -> Vec3 {
        self.0.borrow().velocity.normalize_or_zero()
    }

    fn animation_body_direction(&self) -> Vec3 {
        self.0.borrow().body_direction
    }

    fn actor_target_phase(&self) -> ActorTargetPhase {
        self.0.borrow().phase
    }

    fn set_movement_output(&mut self, _output: &PathFollowResult) {
        self.0.borrow_mut().movement_outputs += 1;
    }

    fn clear_movement_state(&mut self) {
        self.0.borrow_mut().movement_clears += 1;
    }

    fn set_body_target_direction(&mut self, direction: Vec3) {
        self.0.borrow_mut().body_target = Some(direction);
    }

    fn reset_body_target(&mut self) {
        let mut world = self.0.borrow_mut();
        world.body_target = None;
        world.body_target_resets += 1;
    }

    fn set_actor_path(&mut self, _style: &MovementStyle, path: &MovementPath) {
        self.0.borrow_mut().actor_paths.push(path.clone());
    }

    fn set_actor_style(&mut self, _style: &MovementStyle, _path: &MovementPath) {}

    fn set_stance(&mut self, stance: Stance) {
        self.0.borrow_mut().stance = Some(stance);
    }

    fn is_in_cover(&self) -> bool {
        self.0.borrow().in_cover
    }

    fn set_in_cover(&mut self, in_cover: bool) {
        self.0.borrow_mut().in_cover = in_cover;
    }

    fn setup_cover_information(&mut self) {
        self.0.borrow_mut().cover_setups += 1;
    }

    fn update_cover_locations(&mut self) {
        self.0.borrow_mut().cover_updates += 1;
    }

    fn update_looking(&mut self, look: &LookUpdate) {
        self.0.borrow_mut().looks.push(*look);
    }

    fn request_exact_position(&mut self, request: &ExactPositioningRequest) {
        self.0.borrow_mut().exact_position_requests.push(request.clone());
    }

    fn reset_actor_target_request(&mut self) {
        self.0.borrow_mut().actor_target_resets += 1;
    }

    fn is_closest_to_use_smart_object(&self, _link: &OffMeshLinkData) -> bool {
        self.0.borrow().smart_object_closest
    }

    fn prepare_navigate_smart_object(&mut self, link: &OffMeshLinkData) -> bool {
        let mut world = self.0.borrow_mut();
        world.prepared_links.push(link.link_id);
        world.smart_object_prepare_succeeds
    }

    fn invalidate_smart_object_link(&mut self, link: &OffMeshLinkData) {
        self.0.borrow_mut().invalidated_links.push(link.link_id);
    }

    fn teleport(&mut self, position: Vec3, direction: Vec3) {
        let mut world = self.0.borrow_mut();
        world.position = position;
        world.teleports.push((position, direction));
    }

    fn designed_path(&self) -> Option<MovementPath> {
        self.0.borrow().designed_path.clone()
    }

    fn on_movement_plan_produced(&mut self) {
        self.0.borrow_mut().plans_produced += 1;
    }
}

pub(crate) struct FakePathFollower(pub SharedWorld);

impl PathFollower for FakePathFollower {
    fn attach_to_path(&mut self, path: &MovementPath, params: &PathFollowerParams) {
        self.0
            .borrow_mut()
            .attached_paths
            .push((path.clone(), *params));
    }

    fn update(&mut self, _position: Vec3, _velocity: Vec3, _frame_time: f32) -> PathFollowResult {
        let mut world = self.0.borrow_mut();
        world.follower_updates += 1;
        world.follow_result
    }

    fn distance_to_end(&self, _position: Vec3) -> f32 {
        self.0.borrow().distance_to_end
    }

    fn reset(&mut self) {
        self.0.borrow_mut().follower_resets += 1;
    }
}

pub(crate) struct FakeCallbacks {
    world: SharedWorld,
    follower: FakePathFollower,
}

impl MovementActorCallbacks for FakeCallbacks {
    fn queue_path_request(&mut self, request: &PathfindRequest) {
        self.world.borrow_mut().path_requests.push(request.clone());
    }

    fn pathfinder_state(&self) -> PathfinderState {
        self.world.borrow().pathfinder_state
    }

    fn found_path(&self) -> Option<MovementPath> {
        self.world.borrow().found_path.clone()
    }

    fn path_follower(&mut self) -> Option<&mut dyn PathFollower> {
        if self.world.borrow().has_path_follower {
            Some(&mut self.follower)
        } else {
            None
        }
    }
}

/// Bindings backed by `world`
pub(crate) fn bindings(world: &SharedWorld) -> ActorBindings {
    ActorBindings::new(
        Box::new(FakeCallbacks {
            world: world.clone(),
            follower: FakePathFollower(world.clone()),
        }),
        Box::new(FakeAdapter(world.clone())),
    )
}

/// Update context over `actor` with the default configuration
pub(crate) fn context<'a>(
    actor: &'a mut ActorBindings,
    config: &'a MovementConfig,
    frame_time: f32,
) -> MovementUpdateContext<'a> {
    MovementUpdateContext {
        entity_id: EntityId(1),
        actor,
        config,
        custom_navigation_block_factory: None,
        frame_time,
    }
}
