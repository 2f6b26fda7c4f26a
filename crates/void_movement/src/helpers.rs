//! Small utilities shared by the movement blocks

use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::adapter::{PathFollowResult, PathFollowerParams};
use crate::config::MovementConfig;
use crate::path::MovementPath;
use crate::style::MovementStyle;
use glam::Vec3;

/// Declares an agent stuck when it stops getting closer to its path end.
///
/// Progress is measured tick to tick: an update that moves the agent closer
/// by at least the progress threshold resets the timer, anything less adds
/// the frame time to it.
#[derive(Debug, Clone)]
pub struct StuckDetector {
    distance_to_end_in_previous_update: f32,
    time_without_progress: f32,
    stuck_time: f32,
    progress_threshold: f32,
}

impl StuckDetector {
    /// Create a detector
    pub fn new(stuck_time: f32, progress_threshold: f32) -> Self {
        Self {
            distance_to_end_in_previous_update: f32::MAX,
            time_without_progress: 0.0,
            stuck_time,
            progress_threshold,
        }
    }

    /// Create a detector with the configured thresholds
    pub fn from_config(config: &MovementConfig) -> Self {
        Self::new(config.stuck_time, config.stuck_progress_threshold)
    }

    /// Forget all accumulated history
    pub fn reset(&mut self) {
        self.distance_to_end_in_previous_update = f32::MAX;
        self.time_without_progress = 0.0;
    }

    /// Feed the current remaining distance along the path
    pub fn update(&mut self, distance_to_end: f32, frame_time: f32) {
        let progress = self.distance_to_end_in_previous_update - distance_to_end;
        if progress < self.progress_threshold {
            self.time_without_progress += frame_time;
        } else {
            self.time_without_progress = 0.0;
        }
        self.distance_to_end_in_previous_update = distance_to_end;
    }

    pub fn is_agent_stuck(&self) -> bool {
        self.time_without_progress >= self.stuck_time
    }

    pub fn time_without_progress(&self) -> f32 {
        self.time_without_progress
    }
}

impl Default for StuckDetector {
    fn default() -> Self {
        Self::from_config(&MovementConfig::default())
    }
}

/// Outcome of one path follower step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathFollowStep {
    pub result: PathFollowResult,
    pub distance_to_end: f32,
}

/// Path follower settings for following `style` up to `end_distance`
pub fn path_follower_params(
    style: &MovementStyle,
    end_distance: f32,
    is_ending_in_cover: bool,
) -> PathFollowerParams {
    PathFollowerParams {
        end_distance,
        speed: style.speed_value(),
        stop_at_end: end_distance <= 0.0,
        is_ending_in_cover,
    }
}

/// Hand a path to the agent's path follower and animation.
///
/// Returns false when the agent has no path follower.
pub fn attach_path(
    actor: &mut ActorBindings,
    path: &MovementPath,
    style: &MovementStyle,
    params: &PathFollowerParams,
) -> bool {
    actor.adapter.set_actor_path(style, path);
    actor.adapter.set_actor_style(style, path);
    match actor.callbacks.path_follower() {
        Some(follower) => {
            follower.attach_to_path(path, params);
            true
        }
        None => false,
    }
}

/// Advance the agent along its attached path and apply the steering output.
///
/// Returns `None` when the agent has no path follower.
pub fn update_path_following(context: &mut MovementUpdateContext<'_>) -> Option<PathFollowStep> {
    let ActorBindings {
        adapter, callbacks, ..
    } = &mut *context.actor;
    let follower = callbacks.path_follower()?;

    let result = follower.update(
        adapter.physics_position(),
        adapter.velocity(),
        context.frame_time,
    );
    adapter.set_movement_output(&result);

    let distance_to_end = follower.distance_to_end(adapter.physics_position());
    Some(PathFollowStep {
        result,
        distance_to_end,
    })
}

/// Normalized direction from `from` to `to` in the ground plane
pub fn flat_direction(from: Vec3, to: Vec3) -> Vec3 {
    let delta = to - from;
    Vec3::new(delta.x, delta.y, 0.0).normalize_or_zero()
}

/// Distance between two points in the ground plane
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}
