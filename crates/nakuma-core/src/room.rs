//! Room keys.
//!
//! A room is the unit of broadcast fan-out: every connection subscribed to
//! `(room_type, entity_id)` receives the events published there. Room types
//! are free-form on the subscribe path; the mutation handlers only ever
//! publish to the five [`EntityKind`] rooms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite broadcast address. Renders as `"<type>_<id>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomKey {
    /// Room category, e.g. `workspace`.
    pub room_type: String,
    /// ID of the entity the room follows.
    pub entity_id: String,
}

impl RoomKey {
    /// Build a key from its two parts.
    pub fn new(room_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            room_type: room_type.into(),
            entity_id: entity_id.into(),
        }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.room_type, self.entity_id)
    }
}

/// Entity kinds that own a room and a mutation handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Top-level tenant.
    Workspace,
    /// Group of users inside a workspace.
    Team,
    /// Tracked body of work.
    Project,
    /// Single work item.
    Issue,
    /// Saved, grouped issue listing.
    View,
}

impl EntityKind {
    /// Room type string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Team => "team",
            Self::Project => "project",
            Self::Issue => "issue",
            Self::View => "view",
        }
    }

    /// Room keyed by this kind and `entity_id`.
    pub fn room(self, entity_id: impl Into<String>) -> RoomKey {
        RoomKey::new(self.as_str(), entity_id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
