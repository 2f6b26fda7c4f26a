//! Identifiers for movement actors and movement requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the game entity that owns a movement actor
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Get the raw value
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Handle to a queued movement request.
///
/// Zero is reserved for the invalid handle; every handle handed out by
/// the movement system is non-zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MovementRequestId(u32);

impl MovementRequestId {
    /// The invalid handle
    pub const INVALID: Self = Self(0);

    /// Check if this handle refers to a request
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Get the raw value
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for MovementRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "MovementRequestId({})", self.0)
        } else {
            write!(f, "MovementRequestId(invalid)")
        }
    }
}

impl fmt::Display for MovementRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "invalid")
        }
    }
}

/// Monotonic generator for request handles, never yields zero
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    last: u32,
}

impl RequestIdGenerator {
    /// Create a new generator
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Generate the next handle
    pub fn next(&mut self) -> MovementRequestId {
        self.last = self.last.wrapping_add(1);
        if self.last == 0 {
            self.last = 1;
        }
        MovementRequestId(self.last)
    }
}
