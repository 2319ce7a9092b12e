//! `update_issue`: every field is announced as `issue_updated`.

use async_trait::async_trait;
use nakuma_core::messages::present;
use nakuma_core::{EditIssue, EntityKind, EventName, IssueField, IssueId, UserId, check_date_range};
use serde_json::Value;
use tracing::instrument;

use super::{FieldBatch, HubContext, MutationHandler, decode, reject_field, require_id};
use crate::errors::HubError;

/// Applies [`EditIssue`] messages.
pub struct IssueHandler;

#[async_trait]
impl MutationHandler for IssueHandler {
    fn kind(&self) -> EntityKind {
        EntityKind::Issue
    }

    #[instrument(skip_all, fields(entity = "issue"))]
    async fn apply(&self, data: Value, ctx: &HubContext) -> Result<Vec<EventName>, HubError> {
        let edit: EditIssue = decode(data)?;
        let raw_id = require_id(self.kind(), edit.id.as_ref())?;
        let id = IssueId::from(raw_id);
        let mut batch = FieldBatch::new(ctx, self.kind(), raw_id);

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
            (IssueField::Title, present(edit.title.as_ref())),
            (IssueField::Status, present(edit.status.as_ref())),
            (IssueField::TeamId, present(edit.team_id.as_ref())),
            (IssueField::OwnerId, present(edit.owner_id.as_ref())),
            (IssueField::Priority, present(edit.priority.as_ref())),
            (IssueField::Content, present(edit.content.as_ref())),
            (IssueField::ProjectId, present(edit.project_id.as_ref())),
            (IssueField::Label, present(edit.label.as_ref())),
            (IssueField::StartDate, start),
            (IssueField::EndDate, end),
        ];
        for (field, value) in columns {
            if let Some(value) = value {
                let result = ctx.store.set_issue_field(&id, field, value).await;
                batch.updated(field.column(), value, result);
            }
        }
        if let Some(user) = present(edit.assignee.as_ref()) {
            let result = ctx.store.add_issue_assignee(&id, &UserId::from(user)).await;
            batch.updated("assignee", user, result);
        }

        Ok(batch.finish())
    }
}
