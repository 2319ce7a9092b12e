//! `update_workspace`: name and membership.

use async_trait::async_trait;
use nakuma_core::messages::present;
use nakuma_core::{EditWorkspace, EntityKind, EventName, UserId, WorkspaceId};
use serde_json::Value;
use tracing::instrument;

use super::{FieldBatch, HubContext, MutationHandler, decode, require_id};
use crate::errors::HubError;

/// Applies [`EditWorkspace`] messages.
pub struct WorkspaceHandler;

#[async_trait]
impl MutationHandler for WorkspaceHandler {
    fn kind(&self) -> EntityKind {
        EntityKind::Workspace
    }

    #[instrument(skip_all, fields(entity = "workspace"))]
    async fn apply(&self, data: Value, ctx: &HubContext) -> Result<Vec<EventName>, HubError> {
        let edit: EditWorkspace = decode(data)?;
        let raw_id = require_id(self.kind(), edit.workspace_id.as_ref())?;
        let id = WorkspaceId::from(raw_id);
        let mut batch = FieldBatch::new(ctx, self.kind(), raw_id);

        if let Some(name) = present(edit.name.as_ref()) {
            let result = ctx.store.rename_workspace(&id, name).await;
            batch.renamed(name, result);
        }
        if let Some(user) = present(edit.add_member.as_ref()) {
            let result = ctx.store.add_workspace_member(&id, &UserId::from(user)).await;
            batch.member_added(user, result);
        }
        if let Some(user) = present(edit.remove_member.as_ref()) {
            let result = ctx.store.remove_workspace_member(&id, &UserId::from(user)).await;
            batch.member_removed(user, result);
        }

        Ok(batch.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FakeStore, context, listen};
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn each_field_is_its_own_broadcast() {
        let store = FakeStore::new();
        let ctx = context(store.clone());
        let conn = listen(&ctx, &EntityKind::Workspace.room("w1"));

        let events = WorkspaceHandler
            .apply(
                json!({"workspace_id": "w1", "name": "Acme", "add_member": "u2", "remove_member": "u3"}),
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(
            events,
            vec![
                EventName::WorkspaceRenamed,
                EventName::WorkspaceMemberAdded,
                EventName::WorkspaceMemberRemoved
            ]
        );
        assert_eq!(conn.events(), events);
        let envs = conn.envelopes();
        assert_eq!(envs[0].data, json!({"workspace_id": "w1", "name": "Acme"}));
        assert_eq!(envs[1].data, json!({"workspace_id": "w1", "user_id": "u2"}));
        assert_eq!(store.calls().len(), 3);
    }

    #[tokio::test]
    async fn missing_id_touches_nothing() {
        let store = FakeStore::new();
        let ctx = context(store.clone());
        let conn = listen(&ctx, &EntityKind::Workspace.room("w1"));

        let err = WorkspaceHandler
            .apply(json!({"name": "Acme"}), &ctx)
            .await
            .unwrap_err();

        assert_matches!(err, HubError::Validation(_));
        assert!(store.calls().is_empty());
        assert!(conn.frames().is_empty());
    }

    #[tokio::test]
    async fn failed_field_does_not_stop_the_rest() {
        let store = FakeStore::new();
        store.fail("rename_workspace");
        let ctx = context(store.clone());
        let conn = listen(&ctx, &EntityKind::Workspace.room("w1"));

        let events = WorkspaceHandler
            .apply(json!({"workspace_id": "w1", "name": "Acme", "add_member": "u2"}), &ctx)
            .await
            .unwrap();

        assert_eq!(events, vec![EventName::WorkspaceMemberAdded]);
        assert_eq!(conn.events(), vec![EventName::WorkspaceMemberAdded]);
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn empty_strings_are_skipped() {
        let store = FakeStore::new();
        let ctx = context(store.clone());

        let events = WorkspaceHandler
            .apply(json!({"workspace_id": "w1", "name": "", "add_member": null}), &ctx)
            .await
            .unwrap();

        assert!(events.is_empty());
        assert!(store.calls().is_empty());
    }
}
