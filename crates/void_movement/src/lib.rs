//! Void Movement - AI movement planning and execution
//!
//! This crate turns high-level movement requests for game agents into
//! plans of small movement blocks and runs them tick by tick.
//!
//! # Features
//!
//! - Per-agent FIFO request queues with completion callbacks
//! - Path-finding planner with automatic re-planning
//! - Smart-object and custom navigation link traversal
//! - Cover and exact-positioning handling
//! - Stuck and unreachable-target detection
//!
//! The engine plugs in through the [`MovementActorAdapter`] and
//! [`MovementActorCallbacks`] traits.
//!
//! # Example
//!
//! ```ignore
//! use void_movement::prelude::*;
//!
//! let mut movement = MovementSystem::new();
//! movement.register_entity(EntityId(1), Box::new(callbacks), Box::new(adapter));
//!
//! let request = MovementRequest::move_to(EntityId(1), Vec3::new(10.0, 0.0, 0.0))
//!     .with_callback(|result, _| println!("arrived: {}", result.is_success()));
//! movement.queue_request(request);
//!
//! // Every simulation tick
//! movement.update(delta_time);
//! ```

pub mod actor;
pub mod adapter;
pub mod block;
pub mod config;
pub mod error;
pub mod helpers;
pub mod id;
pub mod path;
pub mod plan;
pub mod planner;
pub mod request;
pub mod style;
pub mod system;

#[cfg(test)]
mod test_support;

pub mod prelude {
    pub use crate::actor::{ActorBindings, MovementActor, MovementUpdateContext};
    pub use crate::adapter::{
        ActorTargetPhase, LookUpdate, MovementActorAdapter, MovementActorCallbacks,
        PathFollowResult, PathFollower, PathFollowerParams,
    };
    pub use crate::block::{BlockStatus, CustomNavigationBlockFactory, MovementBlock};
    pub use crate::config::MovementConfig;
    pub use crate::error::MovementError;
    pub use crate::helpers::StuckDetector;
    pub use crate::id::{EntityId, MovementRequestId};
    pub use crate::path::{
        DangerFlags, MovementPath, NavigationType, OffMeshLinkData, PathPoint, PathfindRequest,
        PathfinderState,
    };
    pub use crate::plan::{Plan, PlanStatus};
    pub use crate::planner::{GenericPlanner, Planner, PlannerStatus};
    pub use crate::request::{
        FailureReason, MovementRequest, MovementRequestResult, MovementRequestStatus,
        MovementRequestType, RequestOutcome,
    };
    pub use crate::style::{
        BodyOrientation, ExactPositioningRequest, MovementStyle, Speed, Stance,
    };
    pub use crate::system::MovementSystem;
    pub use glam::Vec3;
}

pub use prelude::*;
