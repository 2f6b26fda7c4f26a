//! Movement style: how a movement request should be carried out

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Body posture while moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Relaxed,
    Alerted,
    Stand,
    Crouch,
}

/// Movement speed, either a named gait or an explicit value in m/s
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Speed {
    #[default]
    Walk,
    Run,
    Sprint,
    Explicit(f32),
}

/// Where the body faces while moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyOrientation {
    #[default]
    FullyTowardsMovementDirection,
    FullyTowardsAimOrLook,
    HalfwayTowardsAimOrLook,
}

/// Request for an animation-synchronized placement at the end of a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactPositioningRequest {
    /// Where the action has to start
    pub position: Vec3,
    /// Facing direction at the start of the action
    pub direction: Vec3,
    /// Tolerance around `position`
    pub start_radius: f32,
    /// Action to play once positioned
    pub action: String,
    /// Accept a less precise placement
    pub lower_precision: bool,
}

impl ExactPositioningRequest {
    /// Create a request for an action at a position
    pub fn new(position: Vec3, direction: Vec3, action: impl Into<String>) -> Self {
        Self {
            position,
            direction,
            start_radius: 0.1,
            action: action.into(),
            lower_precision: false,
        }
    }
}

/// Configuration bundle affecting how a request is satisfied
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementStyle {
    pub stance: Stance,
    pub speed: Speed,
    pub body_orientation: BodyOrientation,
    moving_to_cover: bool,
    moving_along_designed_path: bool,
    turn_towards_movement_direction_before_moving: bool,
    strafe: bool,
    glance_in_movement_direction: bool,
    exact_positioning_request: Option<ExactPositioningRequest>,
}

impl MovementStyle {
    /// Create the default style
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = stance;
        self
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_body_orientation(mut self, orientation: BodyOrientation) -> Self {
        self.body_orientation = orientation;
        self
    }

    pub fn set_moving_to_cover(&mut self, value: bool) {
        self.moving_to_cover = value;
    }

    pub fn set_moving_along_designed_path(&mut self, value: bool) {
        self.moving_along_designed_path = value;
    }

    pub fn set_turn_towards_movement_direction_before_moving(&mut self, value: bool) {
        self.turn_towards_movement_direction_before_moving = value;
    }

    pub fn set_strafe(&mut self, value: bool) {
        self.strafe = value;
    }

    pub fn set_glance_in_movement_direction(&mut self, value: bool) {
        self.glance_in_movement_direction = value;
    }

    pub fn set_exact_positioning_request(&mut self, request: Option<ExactPositioningRequest>) {
        self.exact_positioning_request = request;
    }

    pub fn is_moving_to_cover(&self) -> bool {
        self.moving_to_cover
    }

    pub fn is_moving_along_designed_path(&self) -> bool {
        self.moving_along_designed_path
    }

    pub fn should_turn_towards_movement_direction_before_moving(&self) -> bool {
        self.turn_towards_movement_direction_before_moving
    }

    pub fn should_strafe(&self) -> bool {
        self.strafe
    }

    pub fn should_glance_in_movement_direction(&self) -> bool {
        self.glance_in_movement_direction
    }

    pub fn exact_positioning_request(&self) -> Option<&ExactPositioningRequest> {
        self.exact_positioning_request.as_ref()
    }

    /// Speed in m/s for the named gaits
    pub fn speed_value(&self) -> f32 {
        match self.speed {
            Speed::Walk => 1.5,
            Speed::Run => 4.0,
            Speed::Sprint => 6.5,
            Speed::Explicit(value) => value,
        }
    }
}
