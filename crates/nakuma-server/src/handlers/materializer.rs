//! View materialization.
//!
//! Membership is never patched: every rebuild wipes the view's group-by and
//! membership rows and recomputes them from the team's current issues.
//! A failing step returns immediately; steps already done stay done.

use std::collections::HashSet;
use std::time::Instant;

use metrics::{counter, histogram};
use nakuma_core::{Dimension, TeamId, ViewId};
use nakuma_store::{Store, StoreError};
use tracing::{debug, instrument};

use crate::metrics::{HUB_VIEW_REBUILD_DURATION_SECONDS, HUB_VIEW_REBUILDS_TOTAL};

/// Recomputes a view's issue membership from its group-by dimensions.
pub struct ViewMaterializer<'a> {
    store: &'a dyn Store,
}

impl<'a> ViewMaterializer<'a> {
    /// Materializer over `store`.
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Replace `view`'s group-bys with `dimensions` and rebuild its
    /// membership from `team`'s issues. Returns the number of issues
    /// attached.
    ///
    /// Every distinct value combination over `dimensions` becomes an
    /// equality filter on its non-null values; each matching issue is
    /// attached once. No dimensions means one empty filter, i.e. every
    /// team issue.
    #[instrument(skip_all, fields(view_id = %view, team_id = %team, dimensions = dimensions.len()))]
    pub async fn rebuild(
        &self,
        view: &ViewId,
        team: &TeamId,
        dimensions: &[Dimension],
    ) -> Result<usize, StoreError> {
        let started = Instant::now();

        self.store.clear_view_group_bys(view).await?;
        self.store.clear_view_issues(view).await?;
        for (position, dimension) in dimensions.iter().enumerate() {
            self.store.add_view_group_by(view, *dimension, position).await?;
        }

        let combinations = self.store.group_combinations(team, dimensions).await?;
        let mut attached = HashSet::new();
        for combination in &combinations {
            let filter: Vec<(Dimension, String)> = dimensions
                .iter()
                .zip(combination)
                .filter_map(|(dimension, value)| value.clone().map(|v| (*dimension, v)))
                .collect();
            for issue in self.store.issues_matching(team, &filter).await? {
                if attached.contains(&issue) {
                    continue;
                }
                self.store.attach_issue_to_view(view, &issue).await?;
                let _ = attached.insert(issue);
            }
        }

        counter!(HUB_VIEW_REBUILDS_TOTAL).increment(1);
        histogram!(HUB_VIEW_REBUILD_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        debug!(
            combinations = combinations.len(),
            issues = attached.len(),
            "view rebuilt"
        );
        Ok(attached.len())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
