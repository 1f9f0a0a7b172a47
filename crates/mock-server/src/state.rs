//! In-memory tables behind the mock backend.

use std::sync::Arc;

use axum::http::StatusCode;
use models::{BugReport, Exhibit, Jotform, Note, NoteOwner, NoteOwnerKind, Part};
use tokio::sync::RwLock;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockOptions {
    /// Add a new part to the `part_ids` of every exhibit it names, the way a
    /// backend with a join table does. When off, only the part side is stored.
    pub link_on_create: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            link_on_create: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockStore {
    pub exhibits: Vec<Exhibit>,
    pub parts: Vec<Part>,
    pub jotforms: Vec<Jotform>,
    pub bug_reports: Vec<BugReport>,
    pub requests: Vec<String>,
    next_id: u64,
    // `None` matches any request.
    pending_failures: Vec<(Option<String>, StatusCode)>,
    random_cursor: usize,
}

impl MockStore {
    pub fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    pub fn exhibit_mut(&mut self, id: &str) -> Result<&mut Exhibit, ApiError> {
        self.exhibits
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ApiError::not_found("Exhibit", id))
    }

    pub fn part_mut(&mut self, id: &str) -> Result<&mut Part, ApiError> {
        self.parts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::not_found("Part", id))
    }

    pub fn jotform_mut(&mut self, id: &str) -> Result<&mut Jotform, ApiError> {
        self.jotforms
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| ApiError::not_found("Jotform", id))
    }

    pub fn notes_mut(&mut self, owner: &NoteOwner) -> Result<&mut Vec<Note>, ApiError> {
        match owner.kind {
            NoteOwnerKind::Exhibit => Ok(&mut self.exhibit_mut(&owner.id)?.notes),
            NoteOwnerKind::Part => Ok(&mut self.part_mut(&owner.id)?.notes),
        }
    }

    /// Rotates through exhibits so repeated calls show different splash images.
    pub fn random_exhibit(&mut self) -> Option<Exhibit> {
        if self.exhibits.is_empty() {
            return None;
        }
        let index = self.random_cursor % self.exhibits.len();
        self.random_cursor = self.random_cursor.wrapping_add(1);
        self.exhibits.get(index).cloned()
    }

    pub fn clear(&mut self) {
        self.exhibits.clear();
        self.parts.clear();
        self.jotforms.clear();
        self.bug_reports.clear();
    }

    pub(crate) fn take_failure(&mut self, line: &str) -> Option<StatusCode> {
        let index = self
            .pending_failures
            .iter()
            .position(|(target, _)| target.as_deref().is_none_or(|t| t == line))?;
        Some(self.pending_failures.remove(index).1)
    }
}

/// Shared handle to the store; also the axum router state.
#[derive(Debug, Clone, Default)]
pub struct MockState {
    pub(crate) store: Arc<RwLock<MockStore>>,
    pub(crate) options: MockOptions,
}

impl MockState {
    pub fn new(options: MockOptions) -> Self {
        Self {
            store: Arc::default(),
            options,
        }
    }

    pub fn options(&self) -> MockOptions {
        self.options
    }

    pub async fn insert_exhibit(&self, exhibit: Exhibit) {
        self.store.write().await.exhibits.push(exhibit);
    }

    pub async fn insert_part(&self, part: Part) {
        self.store.write().await.parts.push(part);
    }

    pub async fn insert_jotform(&self, jotform: Jotform) {
        self.store.write().await.jotforms.push(jotform);
    }

    pub async fn exhibits(&self) -> Vec<Exhibit> {
        self.store.read().await.exhibits.clone()
    }

    pub async fn parts(&self) -> Vec<Part> {
        self.store.read().await.parts.clone()
    }

    pub async fn jotforms(&self) -> Vec<Jotform> {
        self.store.read().await.jotforms.clone()
    }

    pub async fn bug_reports(&self) -> Vec<BugReport> {
        self.store.read().await.bug_reports.clone()
    }

    /// Every request seen so far as `"METHOD /path"`.
    pub async fn requests(&self) -> Vec<String> {
        self.store.read().await.requests.clone()
    }

    pub async fn request_count(&self, line: &str) -> usize {
        self.store
            .read()
            .await
            .requests
            .iter()
            .filter(|r| r.as_str() == line)
            .count()
    }

    /// Answer the next `count` requests with `status` before touching any table.
    pub async fn fail_next(&self, count: usize, status: StatusCode) {
        let mut store = self.store.write().await;
        store
            .pending_failures
            .extend(std::iter::repeat_n((None, status), count));
    }

    /// Fail the next request whose line (`"GET /exhibits"`) equals `line`; other
    /// requests pass through untouched.
    pub async fn fail_request(&self, line: impl Into<String>, status: StatusCode) {
        let mut store = self.store.write().await;
        store.pending_failures.push((Some(line.into()), status));
    }
}
