//! # nakuma-core
//!
//! Shared vocabulary for the nakuma real-time hub.
//!
//! - **Branded IDs**: `WorkspaceId`, `TeamId`, `IssueId`, `UserId`, ... as newtypes
//! - **Rooms**: [`RoomKey`] and the [`EntityKind`] each room is keyed by
//! - **Events**: the closed [`EventName`] set and the outbound [`Envelope`]
//! - **Edits**: sparse partial-update messages for every entity kind
//! - **Fields**: issue/project columns and view group-by [`Dimension`]s
//! - **Errors**: [`DomainError`] for validation failures

#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod fields;
pub mod ids;
pub mod messages;
pub mod room;

pub use errors::DomainError;
pub use events::{Envelope, EventName, FieldChange};
pub use fields::{Dimension, IssueField, ProjectField, check_date_range};
pub use ids::{ConnectionId, IssueId, ProjectId, TeamId, UserId, ViewId, WorkspaceId};
pub use messages::{EditIssue, EditProject, EditTeam, EditView, EditWorkspace};
pub use room::{EntityKind, RoomKey};
