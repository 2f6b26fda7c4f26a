//! Collaborator interfaces the movement system drives
//!
//! The movement system never touches physics, animation or navigation data
//! directly. Every agent is registered with two trait objects:
//!
//! - [`MovementActorAdapter`]: the agent's body (position, velocity,
//!   orientation, cover and exact-positioning state)
//! - [`MovementActorCallbacks`]: the agent's pathfinder and path follower

use crate::path::{MovementPath, OffMeshLinkData, PathfindRequest, PathfinderState};
use crate::style::{ExactPositioningRequest, MovementStyle, Stance};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Speed below which an agent no longer counts as moving
pub const MOVING_SPEED_THRESHOLD: f32 = 0.1;

/// Progress of an exact-positioning / smart-object animation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActorTargetPhase {
    #[default]
    None,
    Waiting,
    Starting,
    Started,
    Playing,
    StartedAndFinished,
    Finished,
    Error,
}

impl ActorTargetPhase {
    /// Whether the positioning action has begun playing
    pub fn has_started(self) -> bool {
        matches!(
            self,
            ActorTargetPhase::Started | ActorTargetPhase::Playing | ActorTargetPhase::StartedAndFinished
        )
    }
}

/// Steering output of one path follower step
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathFollowResult {
    /// Desired velocity
    pub velocity_out: Vec3,
    /// Point on the path the follower is steering towards
    pub follow_target_position: Vec3,
    /// The end of the path (minus the end distance) has been reached
    pub reached_end: bool,
    /// The follow target can still be reached
    pub target_reachable: bool,
}

/// How the path follower should treat the attached path
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathFollowerParams {
    /// Distance before the path end at which it counts as reached
    pub end_distance: f32,
    /// Desired speed in m/s
    pub speed: f32,
    /// Slow down to a halt at the end of the path
    pub stop_at_end: bool,
    /// The path leads into cover
    pub is_ending_in_cover: bool,
}

/// Data handed to the adapter to drive looking while following a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookUpdate {
    pub frame_time: f32,
    pub target_reachable: bool,
    pub distance_to_end: f32,
    pub follow_target_position: Vec3,
    pub movement_direction: Vec3,
    pub glance_in_movement_direction: bool,
}

/// Steps an agent along an attached path
pub trait PathFollower {
    /// Attach a path, replacing the previous one
    fn attach_to_path(&mut self, path: &MovementPath, params: &PathFollowerParams);

    /// Advance along the path
    fn update(&mut self, position: Vec3, velocity: Vec3, frame_time: f32) -> PathFollowResult;

    /// Remaining distance along the path from `position`
    fn distance_to_end(&self, position: Vec3) -> f32;

    /// Detach from the current path
    fn reset(&mut self);
}

/// Access to the agent's pathfinder and path follower
pub trait MovementActorCallbacks {
    /// Start a path-find; the result is polled with [`Self::pathfinder_state`]
    fn queue_path_request(&mut self, request: &PathfindRequest);

    /// State of the most recently queued path-find
    fn pathfinder_state(&self) -> PathfinderState;

    /// The path found by the most recent successful path-find
    fn found_path(&self) -> Option<MovementPath>;

    /// The agent's path follower, if it has one
    fn path_follower(&mut self) -> Option<&mut dyn PathFollower>;
}

/// Facade onto an agent's body: physics, animation and AI state
pub trait MovementActorAdapter {
    fn physics_position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn move_direction(&self) -> Vec3;
    fn animation_body_direction(&self) -> Vec3;
    fn actor_target_phase(&self) -> ActorTargetPhase;

    fn is_moving(&self) -> bool {
        self.velocity().length_squared() > MOVING_SPEED_THRESHOLD * MOVING_SPEED_THRESHOLD
    }

    /// Apply the steering output of the path follower
    fn set_movement_output(&mut self, output: &PathFollowResult);
    /// Stop producing movement immediately
    fn clear_movement_state(&mut self);

    fn set_body_target_direction(&mut self, direction: Vec3);
    fn reset_body_target(&mut self);

    fn set_actor_path(&mut self, style: &MovementStyle, path: &MovementPath);
    fn set_actor_style(&mut self, style: &MovementStyle, path: &MovementPath);
    fn set_stance(&mut self, stance: Stance);

    fn update_looking(&mut self, _look: &LookUpdate) {}

    fn is_in_cover(&self) -> bool;
    fn set_in_cover(&mut self, in_cover: bool);
    fn setup_cover_information(&mut self);
    fn update_cover_locations(&mut self);

    fn request_exact_position(&mut self, request: &ExactPositioningRequest);
    fn reset_actor_target_request(&mut self);

    fn is_closest_to_use_smart_object(&self, link: &OffMeshLinkData) -> bool;
    fn prepare_navigate_smart_object(&mut self, link: &OffMeshLinkData) -> bool;
    fn invalidate_smart_object_link(&mut self, _link: &OffMeshLinkData) {}

    /// Last-resort placement after a failed exact positioning
    fn teleport(&mut self, position: Vec3, direction: Vec3);

    /// Path authored by a designer for this agent
    fn designed_path(&self) -> Option<MovementPath>;

    fn on_movement_plan_produced(&mut self) {}
}
