//! `update_view`: rename, retarget and rematerialize a saved view.
//!
//! Unlike the other handlers, a view edit is one path rather than a set of
//! independent fields: the first failing step aborts the rest and nothing is
//! published. A successful edit publishes exactly one `view_updated`.

use async_trait::async_trait;
use nakuma_core::messages::present;
use nakuma_core::{Dimension, EditView, EntityKind, EventName, TeamId, ViewId};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use super::materializer::ViewMaterializer;
use super::{HubContext, MutationHandler, decode, require_id};
use crate::errors::HubError;

/// Applies [`EditView`] messages.
pub struct ViewHandler;

#[async_trait]
impl MutationHandler for ViewHandler {
    fn kind(&self) -> EntityKind {
        EntityKind::View
    }

    #[instrument(skip_all, fields(entity = "view"))]
    async fn apply(&self, data: Value, ctx: &HubContext) -> Result<Vec<EventName>, HubError> {
        let edit: EditView = decode(data)?;
        let raw_id = require_id(self.kind(), edit.id.as_ref())?;
        let id = ViewId::from(raw_id);
        // Validate before anything destructive runs.
        let dimensions = edit
            .group_bys
            .as_deref()
            .map(Dimension::parse_list)
            .transpose()?;
        let team_override = present(edit.team_id.as_ref()).map(TeamId::from);

        let mut payload = Map::new();
        let _ = payload.insert("view_id".into(), json!(raw_id));

        if let Some(name) = present(edit.name.as_ref()) {
            ctx.store.rename_view(&id, name).await?;
            let _ = payload.insert("name".into(), json!(name));
        }
        if let Some(team) = &team_override {
            ctx.store.set_view_team(&id, team).await?;
            let _ = payload.insert("team_id".into(), json!(team.as_str()));
        }
        if let Some(dimensions) = dimensions {
            let team = match team_override {
                Some(team) => team,
                None => ctx.store.view_team(&id).await?,
            };
            let count = ViewMaterializer::new(ctx.store.as_ref())
                .rebuild(&id, &team, &dimensions)
                .await?;
            let names: Vec<&str> = dimensions.iter().map(|d| d.column()).collect();
            let _ = payload.insert("group_bys".into(), json!(names));
            let _ = payload.insert("issue_count".into(), json!(count));
        }

        if payload.len() == 1 {
            debug!(view_id = raw_id, "view edit carried no changes");
            return Ok(Vec::new());
        }
        let event = EventName::ViewUpdated;
        let _ = ctx
            .dispatcher
            .publish(&self.kind().room(raw_id), event, Value::Object(payload));
        Ok(vec![event])
    }
}
