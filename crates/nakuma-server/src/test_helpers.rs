//! Fakes shared by the hub's unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use nakuma_core::{
    ConnectionId, Dimension, Envelope, EventName, IssueField, IssueId, ProjectField, ProjectId,
    RoomKey, TeamId, UserId, ViewId, WorkspaceId,
};
use nakuma_store::{Result as StoreResult, Store, StoreError};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::errors::TransportError;
use crate::handlers::HubContext;
use crate::websocket::broadcast::Dispatcher;
use crate::websocket::connection::Connection;
use crate::websocket::protocol::FrameSource;
use crate::websocket::registry::ConnectionRegistry;

// ── Connection ──────────────────────────────────────────────────────────────

/// In-memory connection that keeps every frame it was sent.
pub(crate) struct RecordingConnection {
    id: ConnectionId,
    frames: Mutex<Vec<String>>,
    failing: AtomicBool,
    closed: AtomicBool,
}

impl RecordingConnection {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(),
            frames: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    /// Connection whose every send fails.
    pub(crate) fn failing() -> Arc<Self> {
        let conn = Self::new();
        conn.set_failing(true);
        conn
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn frames(&self) -> Vec<String> {
        self.frames.lock().clone()
    }

    pub(crate) fn envelopes(&self) -> Vec<Envelope> {
        self.frames()
            .iter()
            .map(|f| serde_json::from_str(f).unwrap())
            .collect()
    }

    pub(crate) fn events(&self) -> Vec<EventName> {
        self.envelopes().into_iter().map(|e| e.event).collect()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connection for RecordingConnection {
    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn send(&self, frame: Arc<str>) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Full);
        }
        self.frames.lock().push(frame.to_string());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// ── Frame sources ───────────────────────────────────────────────────────────

/// Replays a fixed script, then ends (or fails) the stream.
pub(crate) struct ScriptedSource {
    frames: VecDeque<Result<String, TransportError>>,
}

impl ScriptedSource {
    pub(crate) fn new<S: Into<String>>(frames: impl IntoIterator<Item = S>) -> Self {
        Self {
            frames: frames.into_iter().map(|f| Ok(f.into())).collect(),
        }
    }

    /// Finish the script with a read failure instead of a clean end.
    pub(crate) fn then_fail(mut self, reason: &str) -> Self {
        self.frames
            .push_back(Err(TransportError::Read(reason.to_owned())));
        self
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        self.frames.pop_front()
    }
}

/// Frames fed from a test through a channel; dropping the sender ends it.
pub(crate) struct ChannelSource {
    rx: mpsc::UnboundedReceiver<String>,
}

impl ChannelSource {
    pub(crate) fn new() -> (mpsc::UnboundedSender<String>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        self.rx.recv().await.map(Ok)
    }
}

/// Poll `cond` until it holds, panicking after one second.
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within 1s");
}

// ── Store ───────────────────────────────────────────────────────────────────

/// Store that records each call and fails the ones it is told to.
#[derive(Default)]
pub(crate) struct FakeStore {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    view_team: Mutex<Option<TeamId>>,
    combinations: Mutex<Vec<Vec<Option<String>>>>,
    matches: Mutex<Vec<IssueId>>,
}

impl FakeStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call to `method` fail.
    pub(crate) fn fail(&self, method: &'static str) {
        let _ = self.failing.lock().insert(method);
    }

    pub(crate) fn set_view_team(&self, team: &str) {
        *self.view_team.lock() = Some(TeamId::from(team));
    }

    pub(crate) fn set_combinations(&self, combos: Vec<Vec<Option<String>>>) {
        *self.combinations.lock() = combos;
    }

    pub(crate) fn set_matches(&self, issues: &[&str]) {
        *self.matches.lock() = issues.iter().map(|i| IssueId::from(*i)).collect();
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Calls whose method name is `method`.
    pub(crate) fn calls_to(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .collect()
    }

    fn record(&self, method: &'static str, args: String) -> StoreResult<()> {
        self.calls.lock().push(format!("{method} {args}"));
        if self.failing.lock().contains(method) {
            return Err(StoreError::Internal(format!("injected {method} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn rename_workspace(&self, id: &WorkspaceId, name: &str) -> StoreResult<()> {
        self.record("rename_workspace", format!("{id} {name}"))
    }
    async fn add_workspace_member(&self, id: &WorkspaceId, user: &UserId) -> StoreResult<()> {
        self.record("add_workspace_member", format!("{id} {user}"))
    }
    async fn remove_workspace_member(&self, id: &WorkspaceId, user: &UserId) -> StoreResult<()> {
        self.record("remove_workspace_member", format!("{id} {user}"))
    }

    async fn rename_team(&self, id: &TeamId, name: &str) -> StoreResult<()> {
        self.record("rename_team", format!("{id} {name}"))
    }
    async fn add_team_member(&self, id: &TeamId, user: &UserId) -> StoreResult<()> {
        self.record("add_team_member", format!("{id} {user}"))
    }
    async fn remove_team_member(&self, id: &TeamId, user: &UserId) -> StoreResult<()> {
        self.record("remove_team_member", format!("{id} {user}"))
    }
    async fn set_team_leader(&self, id: &TeamId, user: &UserId) -> StoreResult<()> {
        self.record("set_team_leader", format!("{id} {user}"))
    }

    async fn rename_project(&self, id: &ProjectId, name: &str) -> StoreResult<()> {
        self.record("rename_project", format!("{id} {name}"))
    }
    async fn set_project_leader(&self, id: &ProjectId, user: &UserId) -> StoreResult<()> {
        self.record("set_project_leader", format!("{id} {user}"))
    }
    async fn add_project_member(&self, id: &ProjectId, user: &UserId) -> StoreResult<()> {
        self.record("add_project_member", format!("{id} {user}"))
    }
    async fn remove_project_member(&self, id: &ProjectId, user: &UserId) -> StoreResult<()> {
        self.record("remove_project_member", format!("{id} {user}"))
    }
    async fn set_project_field(
        &self,
        id: &ProjectId,
        field: ProjectField,
        value: &str,
    ) -> StoreResult<()> {
        self.record("set_project_field", format!("{id} {field} {value}"))
    }

    async fn set_issue_field(&self, id: &IssueId, field: IssueField, value: &str) -> StoreResult<()> {
        self.record("set_issue_field", format!("{id} {field} {value}"))
    }
    async fn add_issue_assignee(&self, id: &IssueId, user: &UserId) -> StoreResult<()> {
        self.record("add_issue_assignee", format!("{id} {user}"))
    }

    async fn rename_view(&self, id: &ViewId, name: &str) -> StoreResult<()> {
        self.record("rename_view", format!("{id} {name}"))
    }
    async fn set_view_team(&self, id: &ViewId, team: &TeamId) -> StoreResult<()> {
        self.record("set_view_team", format!("{id} {team}"))
    }
    async fn view_team(&self, id: &ViewId) -> StoreResult<TeamId> {
        self.record("view_team", id.to_string())?;
        self.view_team.lock().clone().ok_or_else(|| StoreError::NotFound {
            kind: "view",
            id: id.to_string(),
        })
    }
    async fn clear_view_group_bys(&self, id: &ViewId) -> StoreResult<()> {
        self.record("clear_view_group_bys", id.to_string())
    }
    async fn clear_view_issues(&self, id: &ViewId) -> StoreResult<()> {
        self.record("clear_view_issues", id.to_string())
    }
    async fn add_view_group_by(
        &self,
        id: &ViewId,
        dimension: Dimension,
        position: usize,
    ) -> StoreResult<()> {
        self.record("add_view_group_by", format!("{id} {dimension} {position}"))
    }
    async fn attach_issue_to_view(&self, id: &ViewId, issue: &IssueId) -> StoreResult<()> {
        self.record("attach_issue_to_view", format!("{id} {issue}"))
    }

    async fn group_combinations(
        &self,
        team: &TeamId,
        dimensions: &[Dimension],
    ) -> StoreResult<Vec<Vec<Option<String>>>> {
        self.record("group_combinations", format!("{team} {}", dimensions.len()))?;
        Ok(self.combinations.lock().clone())
    }

    async fn issues_matching(
        &self,
        team: &TeamId,
        filter: &[(Dimension, String)],
    ) -> StoreResult<Vec<IssueId>> {
        let rendered: Vec<String> = filter.iter().map(|(d, v)| format!("{d}={v}")).collect();
        self.record("issues_matching", format!("{team} {}", rendered.join(",")))?;
        Ok(self.matches.lock().clone())
    }
}

// ── Wiring ──────────────────────────────────────────────────────────────────

/// Handler context over `store` with a fresh registry.
pub(crate) fn context(store: Arc<dyn Store>) -> HubContext {
    let registry = Arc::new(ConnectionRegistry::new());
    HubContext::new(store, Arc::new(Dispatcher::new(registry)))
}

/// Subscribe a recording connection to `room` through `ctx`'s registry.
pub(crate) fn listen(ctx: &HubContext, room: &RoomKey) -> Arc<RecordingConnection> {
    let conn = RecordingConnection::new();
    ctx.dispatcher
        .registry()
        .register(&UserId::from("observer"), conn.clone(), room);
    conn
}
