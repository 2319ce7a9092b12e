//! Branded ID newtypes.
//!
//! Entity IDs arrive from clients as opaque strings and are never parsed;
//! the newtypes only keep a team ID from being passed where an issue ID is
//! expected. Freshly minted IDs (connections, seeded rows) are UUID v7.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mint a new time-ordered ID.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Borrow the raw string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the raw string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

branded_id! {
    /// Identifier of a workspace.
    WorkspaceId
}

branded_id! {
    /// Identifier of a team.
    TeamId
}

branded_id! {
    /// Identifier of a project.
    ProjectId
}

branded_id! {
    /// Identifier of an issue.
    IssueId
}

branded_id! {
    /// Identifier of a saved view.
    ViewId
}

branded_id! {
    /// Authenticated user identity, resolved upstream.
    UserId
}

branded_id! {
    /// Identifier of one live duplex connection.
    ConnectionId
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
