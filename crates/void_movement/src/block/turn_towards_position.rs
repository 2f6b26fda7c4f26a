//! Turn the body to face a point before moving

use super::{BlockStatus, MovementBlock};
use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::helpers::flat_direction;
use glam::Vec3;

/// Rotates the agent towards a point on the ground plane.
///
/// Finishes once the body has stayed aligned for the configured time, or
/// after the turn timeout.
#[derive(Debug, Clone)]
pub struct TurnTowardsPosition {
    position_to_turn_towards: Vec3,
    time_spent_aligned: f32,
    time_spent_turning: f32,
}

impl TurnTowardsPosition {
    pub fn new(position_to_turn_towards: Vec3) -> Self {
        Self {
            position_to_turn_towards,
            time_spent_aligned: 0.0,
            time_spent_turning: 0.0,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.position_to_turn_towards
    }

    /// Continuous time the body has been within the alignment cone
    pub fn time_spent_aligned(&self) -> f32 {
        self.time_spent_aligned
    }
}

impl MovementBlock for TurnTowardsPosition {
    fn begin(&mut self, _actor: &mut ActorBindings) {
        self.time_spent_aligned = 0.0;
        self.time_spent_turning = 0.0;
    }

    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        let adapter = &mut context.actor.adapter;
        self.time_spent_turning += context.frame_time;

        let desired = flat_direction(adapter.physics_position(), self.position_to_turn_towards);
        if desired != Vec3::ZERO {
            adapter.set_body_target_direction(desired);
        }

        let body = adapter.animation_body_direction();
        let body = Vec3::new(body.x, body.y, 0.0).normalize_or_zero();
        let aligned =
            desired == Vec3::ZERO || desired.dot(body) > context.config.turn_alignment_cosine();

        if aligned {
            self.time_spent_aligned += context.frame_time;
        } else {
            self.time_spent_aligned = 0.0;
        }

        if self.time_spent_aligned > context.config.turn_alignment_time {
            return BlockStatus::Finished;
        }

        if self.time_spent_turning > context.config.turn_timeout {
            log::warn!(
                "Entity {} gave up turning towards {} after {:.1}s",
                context.entity_id,
                self.position_to_turn_towards,
                self.time_spent_turning
            );
            return BlockStatus::Finished;
        }

        BlockStatus::Running
    }

    fn end(&mut self, actor: &mut ActorBindings) {
        actor.adapter.reset_body_target();
    }

    fn name(&self) -> &str {
        "TurnTowardsPosition"
    }
}
