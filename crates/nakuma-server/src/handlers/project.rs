//! `update_project`: name, leader, membership and the generic columns.

use async_trait::async_trait;
use nakuma_core::messages::present;
use nakuma_core::{
    EditProject, EntityKind, EventName, ProjectField, ProjectId, UserId, check_date_range,
};
use serde_json::Value;
use tracing::instrument;

use super::{FieldBatch, HubContext, MutationHandler, decode, reject_field, require_id};
use crate::errors::HubError;

/// Applies [`EditProject`] messages.
///
/// `workspace_id`, `status`, `priority`, `label` and the dates all announce
/// themselves as `project_updated`. A bad or inverted date range drops both
/// date fields.
pub struct ProjectHandler;

#[async_trait]
impl MutationHandler for ProjectHandler {
    fn kind(&self) -> EntityKind {
        EntityKind::Project
    }

    #[instrument(skip_all, fields(entity = "project"))]
    async fn apply(&self, data: Value, ctx: &HubContext) -> Result<Vec<EventName>, HubError> {
        let edit: EditProject = decode(data)?;
        let raw_id = require_id(self.kind(), edit.id.as_ref())?;
        let id = ProjectId::from(raw_id);
        let mut batch = FieldBatch::new(ctx, self.kind(), raw_id);

        if let Some(name) = present(edit.name.as_ref()) {
            let result = ctx.store.rename_project(&id, name).await;
            batch.renamed(name, result);
        }
        if let Some(user) = present(edit.leader_id.as_ref()) {
            let result = ctx.store.set_project_leader(&id, &UserId::from(user)).await;
            batch.leader_set(user, result);
        }
        if let Some(user) = present(edit.add_member.as_ref()) {
            let result = ctx.store.add_project_member(&id, &UserId::from(user)).await;
            batch.member_added(user, result);
        }
        if let Some(user) = present(edit.remove_member.as_ref()) {
            let result = ctx.store.remove_project_member(&id, &UserId::from(user)).await;
            batch.member_removed(user, result);
        }

        let start = present(edit.start_date.as_ref());
        let end = present(edit.end_date.as_ref());
        let (start, end) = match check_date_range(start, end) {
            Ok(()) => (start, end),
            Err(e) => {
                reject_field(self.kind(), &e);
                (None, None)
            }
        };

        let columns = [
            (ProjectField::WorkspaceId, present(edit.workspace_id.as_ref())),
            (ProjectField::Status, present(edit.status.as_ref())),
            (ProjectField::Priority, present(edit.priority.as_ref())),
            (ProjectField::Label, present(edit.label.as_ref())),
            (ProjectField::StartDate, start),
            (ProjectField::EndDate, end),
        ];
        for (field, value) in columns {
            if let Some(value) = value {
                let result = ctx.store.set_project_field(&id, field, value).await;
                batch.updated(field.column(), value, result);
            }
        }

        Ok(batch.finish())
    }
}
