//! Paths and the contract with the pathfinder

use crate::id::EntityId;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How a path point has to be traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavigationType {
    /// Plain walkable surface
    #[default]
    Normal,
    /// Entry of a smart-object link (door, ladder, ...)
    SmartObject,
    /// Entry of a game-defined navigation link
    CustomNavigation,
}

/// Payload of an off-mesh link, carried by the link's entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffMeshLinkData {
    /// Link identifier in the navigation data
    pub link_id: u32,
    /// Where the link is entered
    pub entry: Vec3,
    /// Where the link is left
    pub exit: Vec3,
    /// The smart object entity providing the link, if any
    pub object: Option<EntityId>,
}

impl OffMeshLinkData {
    /// Create link data between two positions
    pub fn new(link_id: u32, entry: Vec3, exit: Vec3) -> Self {
        Self {
            link_id,
            entry,
            exit,
            object: None,
        }
    }

    /// Set the entity providing the link
    pub fn with_object(mut self, object: EntityId) -> Self {
        self.object = Some(object);
        self
    }
}

/// A point on a movement path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub position: Vec3,
    pub navigation_type: NavigationType,
    pub off_mesh_link: Option<OffMeshLinkData>,
}

impl PathPoint {
    /// A plain point
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            navigation_type: NavigationType::Normal,
            off_mesh_link: None,
        }
    }

    /// Entry point of a smart-object link
    pub fn smart_object(link: OffMeshLinkData) -> Self {
        Self {
            position: link.entry,
            navigation_type: NavigationType::SmartObject,
            off_mesh_link: Some(link),
        }
    }

    /// Entry point of a custom navigation link
    pub fn custom_navigation(link: OffMeshLinkData) -> Self {
        Self {
            position: link.entry,
            navigation_type: NavigationType::CustomNavigation,
            off_mesh_link: Some(link),
        }
    }

    /// Whether this point starts an off-mesh traversal
    pub fn is_link(&self) -> bool {
        self.navigation_type != NavigationType::Normal
    }
}

/// Ordered sequence of path points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementPath {
    points: Vec<PathPoint>,
}

impl MovementPath {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path of plain points
    pub fn from_positions(positions: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            points: positions.into_iter().map(PathPoint::new).collect(),
        }
    }

    /// Create a path from points
    pub fn from_points(points: Vec<PathPoint>) -> Self {
        Self { points }
    }

    /// Append a point
    pub fn push(&mut self, point: PathPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point of the path
    pub fn start(&self) -> Option<&PathPoint> {
        self.points.first()
    }

    /// Final point of the path
    pub fn destination(&self) -> Option<&PathPoint> {
        self.points.last()
    }

    /// Get total path length
    pub fn total_length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| pair[0].position.distance(pair[1].position))
            .sum()
    }

    /// Whether the path contains any off-mesh link
    pub fn has_links(&self) -> bool {
        self.points.iter().any(PathPoint::is_link)
    }
}

/// State of the outstanding path-find request of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathfinderState {
    StillFinding,
    FoundPath,
    CouldNotFindPath,
}

/// Dangers the pathfinder should route around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DangerFlags {
    pub explosives: bool,
    pub attention_target: bool,
    pub group_mates: bool,
}

impl DangerFlags {
    /// No dangers
    pub const NONE: Self = Self {
        explosives: false,
        attention_target: false,
        group_mates: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Request handed to the pathfinder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathfindRequest {
    pub start: Vec3,
    pub end: Vec3,
    pub up: Vec3,
    /// Length to cut from the end of the found path
    pub length_to_trim_from_path_end: f32,
    pub dangers: DangerFlags,
    pub consider_actors_as_path_obstacles: bool,
}
