//! Entity mutation handlers.
//!
//! Each handler decodes one sparse edit, issues one persistence call per
//! present field, and publishes one event per field that succeeded to the
//! room keyed by the entity's own ID. Fields are independent: a failed call
//! skips that field's event and the rest of the message still applies.

pub mod issue;
pub mod materializer;
pub mod project;
pub mod team;
pub mod view;
pub mod workspace;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use nakuma_core::messages::present;
use nakuma_core::{DomainError, EntityKind, EventName, FieldChange, RoomKey};
use nakuma_store::{Store, StoreError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::errors::HubError;
use crate::metrics::HUB_ERRORS_TOTAL;
use crate::websocket::broadcast::Dispatcher;

/// What a handler can reach: the persistence port and the dispatcher.
#[derive(Clone)]
pub struct HubContext {
    /// Persistence port.
    pub store: Arc<dyn Store>,
    /// Room fan-out.
    pub dispatcher: Arc<Dispatcher>,
}

impl HubContext {
    /// Bundle a store and a dispatcher.
    pub fn new(store: Arc<dyn Store>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { store, dispatcher }
    }
}

/// Trait implemented by every entity mutation handler.
#[async_trait]
pub trait MutationHandler: Send + Sync {
    /// Entity kind this handler edits.
    fn kind(&self) -> EntityKind;

    /// Apply one edit. Returns the events published, in order.
    async fn apply(&self, data: Value, ctx: &HubContext) -> Result<Vec<EventName>, HubError>;
}

/// Frame type → handler.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn MutationHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with the five entity handlers under `update_<entity>`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_all(&mut registry);
        registry
    }

    /// Register a handler for a frame type.
    pub fn register(&mut self, frame_type: &str, handler: impl MutationHandler + 'static) {
        let _ = self.handlers.insert(frame_type.to_owned(), Arc::new(handler));
    }

    /// Whether `frame_type` has a handler.
    pub fn contains(&self, frame_type: &str) -> bool {
        self.handlers.contains_key(frame_type)
    }

    /// Route `data` to the handler for `frame_type`.
    pub async fn dispatch(
        &self,
        frame_type: &str,
        data: Value,
        ctx: &HubContext,
    ) -> Result<Vec<EventName>, HubError> {
        let Some(handler) = self.handlers.get(frame_type) else {
            return Err(HubError::Protocol(format!("unrecognized frame type: {frame_type}")));
        };
        let events = handler.apply(data, ctx).await?;
        debug!(frame_type, entity = %handler.kind(), published = events.len(), "edit applied");
        Ok(events)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register every entity handler.
pub fn register_all(registry: &mut HandlerRegistry) {
    registry.register("update_workspace", workspace::WorkspaceHandler);
    registry.register("update_team", team::TeamHandler);
    registry.register("update_project", project::ProjectHandler);
    registry.register("update_issue", issue::IssueHandler);
    registry.register("update_view", view::ViewHandler);
}

// ── Shared helpers ──────────────────────────────────────────────────────────

/// Decode a frame body into an edit message.
pub(crate) fn decode<T: DeserializeOwned>(data: Value) -> Result<T, HubError> {
    serde_json::from_value(data).map_err(|e| HubError::Protocol(format!("invalid edit body: {e}")))
}

/// The edit's own ID, or a validation failure when absent or empty.
pub(crate) fn require_id(kind: EntityKind, id: Option<&String>) -> Result<&str, HubError> {
    present(id).ok_or(HubError::Validation(DomainError::MissingId { kind }))
}

/// Log a field dropped by validation while the rest of the edit proceeds.
pub(crate) fn reject_field(kind: EntityKind, err: &DomainError) {
    warn!(entity = %kind, error = %err, "field rejected");
    counter!(HUB_ERRORS_TOTAL, "kind" => "validation").increment(1);
}

/// Per-edit accumulator: turns each field's persistence result into at most
/// one published event.
pub(crate) struct FieldBatch<'a> {
    ctx: &'a HubContext,
    kind: EntityKind,
    id: String,
    room: RoomKey,
    published: Vec<EventName>,
}

impl<'a> FieldBatch<'a> {
    pub(crate) fn new(ctx: &'a HubContext, kind: EntityKind, id: &str) -> Self {
        Self {
            ctx,
            kind,
            id: id.to_owned(),
            room: kind.room(id),
            published: Vec::new(),
        }
    }

    pub(crate) fn renamed(&mut self, name: &str, result: Result<(), StoreError>) {
        self.settle("name", FieldChange::Renamed, result, [("name", json!(name))]);
    }

    pub(crate) fn member_added(&mut self, user: &str, result: Result<(), StoreError>) {
        self.settle("add_member", FieldChange::MemberAdded, result, [("user_id", json!(user))]);
    }

    pub(crate) fn member_removed(&mut self, user: &str, result: Result<(), StoreError>) {
        self.settle(
            "remove_member",
            FieldChange::MemberRemoved,
            result,
            [("user_id", json!(user))],
        );
    }

    pub(crate) fn leader_set(&mut self, user: &str, result: Result<(), StoreError>) {
        self.settle("leader", FieldChange::LeaderSet, result, [("leader_id", json!(user))]);
    }

    pub(crate) fn updated(&mut self, field: &str, value: &str, result: Result<(), StoreError>) {
        self.settle(
            field,
            FieldChange::Updated,
            result,
            [("field", json!(field)), ("value", json!(value))],
        );
    }

    fn settle<const N: usize>(
        &mut self,
        field: &str,
        change: FieldChange,
        result: Result<(), StoreError>,
        extra: [(&str, Value); N],
    ) {
        if let Err(e) = result {
            warn!(entity = %self.kind, id = %self.id, field, error = %e, "field update failed");
            counter!(HUB_ERRORS_TOTAL, "kind" => "persistence").increment(1);
            return;
        }
        let Some(event) = EventName::derive(self.kind, change) else {
            return;
        };
        let mut payload = Map::new();
        let _ = payload.insert(format!("{}_id", self.kind), json!(self.id));
        for (key, value) in extra {
            let _ = payload.insert(key.to_owned(), value);
        }
        let _ = self
            .ctx
            .dispatcher
            .publish(&self.room, event, Value::Object(payload));
        self.published.push(event);
    }

    pub(crate) fn finish(self) -> Vec<EventName> {
        self.published
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
