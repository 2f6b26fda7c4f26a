//! Movement requests, their results and their diagnostic status

use crate::id::{EntityId, MovementRequestId};
use crate::path::{DangerFlags, PathfindRequest};
use crate::style::MovementStyle;
use crate::system::MovementSystem;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Completion callback of a movement request.
///
/// Invoked exactly once when the request reaches a terminal outcome. The
/// system is handed back so the callback can queue follow-up requests.
pub type MovementRequestCallback = Rc<dyn Fn(&MovementRequestResult, &mut MovementSystem)>;

/// What a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementRequestType {
    #[default]
    MoveTo,
    Stop,
}

/// A caller's high-level movement intent
#[derive(Clone, Default)]
pub struct MovementRequest {
    pub request_type: MovementRequestType,
    pub entity_id: EntityId,
    pub destination: Vec3,
    pub style: MovementStyle,
    pub callback: Option<MovementRequestCallback>,
    pub length_to_trim_from_path_end: f32,
    pub dangers: DangerFlags,
    pub consider_actors_as_path_obstacles: bool,
}

impl MovementRequest {
    /// Request to move an entity to a destination
    pub fn move_to(entity_id: EntityId, destination: Vec3) -> Self {
        Self {
            request_type: MovementRequestType::MoveTo,
            entity_id,
            destination,
            ..Default::default()
        }
    }

    /// Request to stop an entity
    pub fn stop(entity_id: EntityId) -> Self {
        Self {
            request_type: MovementRequestType::Stop,
            entity_id,
            ..Default::default()
        }
    }

    /// Set the movement style
    pub fn with_style(mut self, style: MovementStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the completion callback
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&MovementRequestResult, &mut MovementSystem) + 'static,
    {
        self.callback = Some(Rc::new(callback));
        self
    }

    /// Set the dangers the path should avoid
    pub fn with_dangers(mut self, dangers: DangerFlags) -> Self {
        self.dangers = dangers;
        self
    }

    pub fn is_move_to(&self) -> bool {
        self.request_type == MovementRequestType::MoveTo
    }

    pub fn is_stop(&self) -> bool {
        self.request_type == MovementRequestType::Stop
    }

    /// Build the path-find request for an agent standing at `start`
    pub fn pathfind_request(&self, start: Vec3) -> PathfindRequest {
        PathfindRequest {
            start,
            end: self.destination,
            up: Vec3::Z,
            length_to_trim_from_path_end: self.length_to_trim_from_path_end,
            dangers: self.dangers,
            consider_actors_as_path_obstacles: self.consider_actors_as_path_obstacles,
        }
    }
}

impl fmt::Debug for MovementRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovementRequest")
            .field("request_type", &self.request_type)
            .field("entity_id", &self.entity_id)
            .field("destination", &self.destination)
            .field("style", &self.style)
            .field("has_callback", &self.callback.is_some())
            .field("length_to_trim_from_path_end", &self.length_to_trim_from_path_end)
            .field("dangers", &self.dangers)
            .field(
                "consider_actors_as_path_obstacles",
                &self.consider_actors_as_path_obstacles,
            )
            .finish()
    }
}

/// Why a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FailureReason {
    #[error("could not find a path to the requested destination")]
    CouldNotFindPathToRequestedDestination,

    #[error("could not move along the designer designed path")]
    CouldNotMoveAlongDesignerDesignedPath,

    #[error("failed to produce a successful plan after the maximum number of attempts")]
    FailedToProduceSuccessfulPlanAfterMaximumNumberOfAttempts,
}

/// Terminal outcome of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestOutcome {
    Success,
    Failure(FailureReason),
}

/// Result handed to the completion callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementRequestResult {
    pub request_id: MovementRequestId,
    pub outcome: RequestOutcome,
}

impl MovementRequestResult {
    pub fn success(request_id: MovementRequestId) -> Self {
        Self {
            request_id,
            outcome: RequestOutcome::Success,
        }
    }

    pub fn failure(request_id: MovementRequestId, reason: FailureReason) -> Self {
        Self {
            request_id,
            outcome: RequestOutcome::Failure(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == RequestOutcome::Success
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.outcome {
            RequestOutcome::Success => None,
            RequestOutcome::Failure(reason) => Some(reason),
        }
    }
}

/// Snapshot of a plan, for diagnostics only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSnapshot {
    pub block_names: Vec<String>,
    pub current_block_index: Option<usize>,
}

/// Where a request currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MovementRequestStatus {
    #[default]
    NotQueued,
    Queued,
    FindingPath,
    ExecutingPlan(PlanSnapshot),
}

impl fmt::Display for MovementRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementRequestStatus::NotQueued => write!(f, "Not queued"),
            MovementRequestStatus::Queued => write!(f, "Queued"),
            MovementRequestStatus::FindingPath => write!(f, "Finding path"),
            MovementRequestStatus::ExecutingPlan(plan) => {
                write!(f, "Executing plan:")?;
                for (index, name) in plan.block_names.iter().enumerate() {
                    let separator = if index == 0 { " " } else { " > " };
                    if plan.current_block_index == Some(index) {
                        write!(f, "{}[{}]", separator, name)?;
                    } else {
                        write!(f, "{}{}", separator, name)?;
                    }
                }
                Ok(())
            }
        }
    }
}
