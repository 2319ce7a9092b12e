//! `update_team`: name, membership and leader.

use async_trait::async_trait;
use nakuma_core::messages::present;
use nakuma_core::{EditTeam, EntityKind, EventName, TeamId, UserId};
use serde_json::Value;
use tracing::instrument;

use super::{FieldBatch, HubContext, MutationHandler, decode, require_id};
use crate::errors::HubError;

/// Applies [`EditTeam`] messages.
///
/// Removing the current leader clears the leader slot inside the same store
/// call; only `team_member_removed` is published for it.
pub struct TeamHandler;

#[async_trait]
impl MutationHandler for TeamHandler {
    fn kind(&self) -> EntityKind {
        EntityKind::Team
    }

    #[instrument(skip_all, fields(entity = "team"))]
    async fn apply(&self, data: Value, ctx: &HubContext) -> Result<Vec<EventName>, HubError> {
        let edit: EditTeam = decode(data)?;
        let raw_id = require_id(self.kind(), edit.team_id.as_ref())?;
        let id = TeamId::from(raw_id);
        let mut batch = FieldBatch::new(ctx, self.kind(), raw_id);

        if let Some(name) = present(edit.name.as_ref()) {
            let result = ctx.store.rename_team(&id, name).await;
            batch.renamed(name, result);
        }
        if let Some(user) = present(edit.add_member.as_ref()) {
            let result = ctx.store.add_team_member(&id, &UserId::from(user)).await;
            batch.member_added(user, result);
        }
        if let Some(user) = present(edit.remove_member.as_ref()) {
            let result = ctx.store.remove_team_member(&id, &UserId::from(user)).await;
            batch.member_removed(user, result);
        }
        if let Some(user) = present(edit.leader.as_ref()) {
            let result = ctx.store.set_team_leader(&id, &UserId::from(user)).await;
            batch.leader_set(user, result);
        }

        Ok(batch.finish())
    }
}
