//! Path following

use super::{BlockStatus, MovementBlock};
use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::adapter::LookUpdate;
use crate::helpers::{attach_path, path_follower_params, update_path_following, StuckDetector};
use crate::path::MovementPath;
use crate::style::MovementStyle;

/// Drives the path follower along a path until it is `end_distance` away
/// from the end.
///
/// Fails when the agent stops making progress or the follow target stays
/// unreachable for too long.
pub struct FollowPath {
    path: MovementPath,
    end_distance: f32,
    style: MovementStyle,
    ends_in_cover: bool,
    stuck_detector: Option<StuckDetector>,
    time_target_unreachable: f32,
}

impl FollowPath {
    pub fn new(
        path: MovementPath,
        end_distance: f32,
        style: MovementStyle,
        ends_in_cover: bool,
    ) -> Self {
        Self {
            path,
            end_distance,
            style,
            ends_in_cover,
            stuck_detector: None,
            time_target_unreachable: 0.0,
        }
    }

    pub fn path(&self) -> &MovementPath {
        &self.path
    }

    pub fn end_distance(&self) -> f32 {
        self.end_distance
    }

    pub fn style(&self) -> &MovementStyle {
        &self.style
    }

    pub fn ends_in_cover(&self) -> bool {
        self.ends_in_cover
    }
}

impl MovementBlock for FollowPath {
    fn begin(&mut self, actor: &mut ActorBindings) {
        self.stuck_detector = None;
        self.time_target_unreachable = 0.0;

        let params = path_follower_params(&self.style, self.end_distance, self.ends_in_cover);
        attach_path(actor, &self.path, &self.style, &params);
    }

    fn update(&mut self, context: &mut MovementUpdateContext<'_>) -> BlockStatus {
        let Some(step) = update_path_following(context) else {
            return BlockStatus::CantBeFinished;
        };

        if self.ends_in_cover && step.distance_to_end < context.config.cover_update_distance {
            context.actor.adapter.update_cover_locations();
        }

        let movement_direction = context.actor.adapter.move_direction();
        context.actor.adapter.update_looking(&LookUpdate {
            frame_time: context.frame_time,
            target_reachable: step.result.target_reachable,
            distance_to_end: step.distance_to_end,
            follow_target_position: step.result.follow_target_position,
            movement_direction,
            glance_in_movement_direction: self.style.should_glance_in_movement_direction(),
        });

        if step.result.reached_end {
            return BlockStatus::Finished;
        }

        let config = context.config;
        let detector = self
            .stuck_detector
            .get_or_insert_with(|| StuckDetector::from_config(config));
        detector.update(step.distance_to_end, context.frame_time);
        if detector.is_agent_stuck() {
            log::debug!(
                "Entity {} is stuck {:.1}m from the end of its path",
                context.entity_id,
                step.distance_to_end
            );
            return BlockStatus::CantBeFinished;
        }

        if step.result.target_reachable {
            self.time_target_unreachable = 0.0;
        } else {
            self.time_target_unreachable += context.frame_time;
            if self.time_target_unreachable > config.unreachable_target_timeout {
                log::debug!(
                    "Entity {} could not reach its follow target for {:.1}s",
                    context.entity_id,
                    self.time_target_unreachable
                );
                return BlockStatus::CantBeFinished;
            }
        }

        BlockStatus::Running
    }

    fn end(&mut self, actor: &mut ActorBindings) {
        if let Some(follower) = actor.callbacks.path_follower() {
            follower.reset();
        }
    }

    fn name(&self) -> &str {
        "FollowPath"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementConfig;
    use crate::test_support::{bindings, context, FakeWorld};
    use glam::Vec3;

    fn straight_path() -> MovementPath {
        MovementPath::from_positions([Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)])
    }

    #[test]
    fn test_begin_attaches_path() {
        let world = FakeWorld::shared();
        let mut actor = bindings(&world);

        let mut block = FollowPath::new(straight_path(), 2.5, MovementStyle::default(), false);
        block.begin(&mut actor);

        let world = world.borrow();
        assert_eq!(world.attached_paths.len(), 1);
        let (path, params) = &world.attached_paths[0];
        assert_eq!(path.len(), 2);
        assert_eq!(params.end_distance, 2.5);
        assert!(!params.stop_at_end);
        assert_eq!(world.actor_paths.len(), 1);
    }

    #[test]
    fn test_finishes_when_end_reached() {
        let world = FakeWorld::shared();
        let mut actor = bindings(&world);
        let config = MovementConfig::default();

        let mut block = FollowPath::new(straight_path(), 0.0, MovementStyle::default(), false);
        block.begin(&mut actor);

        {
            let mut ctx = context(&mut actor, &config, 0.1);
            assert_eq!(block.update(&mut ctx), BlockStatus::Running);
        }

        world.borrow_mut().follow_result.reached_end = true;
        let mut ctx = context(&mut actor, &config, 0.1);
        assert_eq!(block.update(&mut ctx), BlockStatus::Finished);
        assert_eq!(world.borrow().movement_outputs, 2);
    }

    #[test]
    fn test_look_update_carries_movement_direction() {
        let world = FakeWorld::shared();
        world.borrow_mut().velocity = Vec3::new(0.0, 2.0, 0.0);
        let mut actor = bindings(&world);
        let config = MovementConfig::default();

        let mut block = FollowPath::new(straight_path(), 0.0, MovementStyle::default(), false);
        block.begin(&mut actor);
        let mut ctx = context(&mut actor, &config, 0.1);
        block.update(&mut ctx);

        let world = world.borrow();
        let looks = &world.looks;
        assert_eq!(looks.len(), 1);
        assert_eq!(looks[0].movement_direction, Vec3::Y);
        assert_eq!(looks[0].distance_to_end, 10.0);
    }

    #[test]
    fn test_end_detaches_follower() {
        let world = FakeWorld::shared();
        let mut actor = bindings(&world);

        let mut block = FollowPath::new(straight_path(), 0.0, MovementStyle::default(), false);
        block.begin(&mut actor);
        assert_eq!(world.borrow().follower_resets, 0);

        block.end(&mut actor);
        assert_eq!(world.borrow().follower_resets, 1);
    }

    #[test]
    fn test_fails_when_stuck() {
        let world = FakeWorld::shared();
        let mut actor = bindings(&world);
        let config = MovementConfig::default();

        let mut block = FollowPath::new(straight_path(), 0.0, MovementStyle::default(), false);
        block.begin(&mut actor);

        let mut ctx = context(&mut actor, &config, 0.5);
        for _ in 0..6 {
            assert_eq!(block.update(&mut ctx), BlockStatus::Running);
        }
        assert_eq!(block.update(&mut ctx), BlockStatus::CantBeFinished);
    }

    #[test]
    fn test_fails_when_target_unreachable_too_long() {
        let world = FakeWorld::shared();
        world.borrow_mut().follow_result.target_reachable = false;
        let mut actor = bindings(&world);
        let config = MovementConfig::default().with_stuck_time(100.0);

        let mut block = FollowPath::new(straight_path(), 0.0, MovementStyle::default(), false);
        block.begin(&mut actor);

        let mut ctx = context(&mut actor, &config, 1.0);
        for _ in 0..3 {
            assert_eq!(block.update(&mut ctx), BlockStatus::Running);
        }
        assert_eq!(block.update(&mut ctx), BlockStatus::CantBeFinished);
    }

    #[test]
    fn test_reachable_tick_resets_unreachable_timer() {
        let world = FakeWorld::shared();
        world.borrow_mut().follow_result.target_reachable = false;
        let mut actor = bindings(&world);
        let config = MovementConfig::default().with_stuck_time(100.0);

        let mut block = FollowPath::new(straight_path(), 0.0, MovementStyle::default(), false);
        block.begin(&mut actor);

        for _ in 0..3 {
            let mut ctx = context(&mut actor, &config, 1.0);
            assert_eq!(block.update(&mut ctx), BlockStatus::Running);
        }
        world.borrow_mut().follow_result.target_reachable = true;
        {
            let mut ctx = context(&mut actor, &config, 1.0);
            assert_eq!(block.update(&mut ctx), BlockStatus::Running);
        }
        world.borrow_mut().follow_result.target_reachable = false;
        let mut ctx = context(&mut actor, &config, 1.0);
        assert_eq!(block.update(&mut ctx), BlockStatus::Running);
    }

    #[test]
    fn test_updates_cover_locations_near_cover() {
        let world = FakeWorld::shared();
        let mut actor = bindings(&world);
        let config = MovementConfig::default();

        let mut block = FollowPath::new(straight_path(), 0.0, MovementStyle::default(), true);
        block.begin(&mut actor);

        {
            let mut ctx = context(&mut actor, &config, 0.1);
            block.update(&mut ctx);
        }
        assert_eq!(world.borrow().cover_updates, 0);

        world.borrow_mut().distance_to_end = 1.0;
        let mut ctx = context(&mut actor, &config, 0.1);
        block.update(&mut ctx);
        assert_eq!(world.borrow().cover_updates, 1);
    }

    #[test]
    fn test_fails_without_path_follower() {
        let world = FakeWorld::shared();
        world.borrow_mut().has_path_follower = false;
        let mut actor = bindings(&world);
        let config = MovementConfig::default();

        let mut block = FollowPath::new(straight_path(), 0.0, MovementStyle::default(), false);
        block.begin(&mut actor);

        let mut ctx = context(&mut actor, &config, 0.1);
        assert_eq!(block.update(&mut ctx), BlockStatus::CantBeFinished);
    }
}
