//! Selected-query store.
//!
//! Holds the query selected on each project's insights page and announces
//! changes to subscribers. The store keeps at most `capacity` projects; a new
//! project beyond that evicts the one selected least recently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use utoipa::ToSchema;

use common::models::QueryInsightsMetric;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Projects kept by default.
pub const DEFAULT_MAX_PROJECTS: usize = 1024;

/// The query currently selected for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SelectedQuery {
    pub query_id: String,
    /// The query's own metric series, used as the chart overlay.
    pub series: Vec<QueryInsightsMetric>,
}

/// Change to a project's selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent {
    Selected { project_ref: String, query_id: String },
    Cleared { project_ref: String },
}

struct Entry {
    query: SelectedQuery,
    /// Selection order; the smallest value is evicted first.
    touched: u64,
}

#[derive(Default)]
struct Selections {
    entries: HashMap<String, Entry>,
    clock: u64,
}

pub struct QuerySelectionStore {
    selections: RwLock<Selections>,
    capacity: usize,
    events: broadcast::Sender<SelectionEvent>,
}

impl Default for QuerySelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuerySelectionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PROJECTS)
    }

    /// Store that keeps at most `capacity` projects (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            selections: RwLock::new(Selections::default()),
            capacity: capacity.max(1),
            events,
        }
    }

    /// Number of projects with a selection.
    pub async fn len(&self) -> usize {
        self.selections.read().await.entries.len()
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SelectionEvent> {
        self.events.subscribe()
    }

    pub async fn get(&self, project_ref: &str) -> Option<SelectedQuery> {
        self.selections
            .read()
            .await
            .entries
            .get(project_ref)
            .map(|entry| entry.query.clone())
    }

    /// Stores `query` as the project's selection, replacing any previous one.
    ///
    /// A new project on a full store evicts the least recently selected one,
    /// which is announced as cleared.
    pub async fn select(&self, project_ref: &str, query: SelectedQuery) {
        let event = SelectionEvent::Selected {
            project_ref: project_ref.to_string(),
            query_id: query.query_id.clone(),
        };
        let evicted = {
            let mut selections = self.selections.write().await;
            let evicted = if selections.entries.contains_key(project_ref)
                || selections.entries.len() < self.capacity
            {
                None
            } else {
                selections.evict_oldest()
            };
            selections.clock += 1;
            let touched = selections.clock;
            selections
                .entries
                .insert(project_ref.to_string(), Entry { query, touched });
            evicted
        };

        if let Some(project_ref) = evicted {
            debug!(project_ref = %project_ref, "选中查询已淘汰");
            self.publish(SelectionEvent::Cleared { project_ref });
        }
        self.publish(event);
    }

    /// Removes the project's selection; publishes only when one existed.
    pub async fn clear(&self, project_ref: &str) -> Option<SelectedQuery> {
        let removed = self
            .selections
            .write()
            .await
            .entries
            .remove(project_ref)
            .map(|entry| entry.query);
        if removed.is_some() {
            self.publish(SelectionEvent::Cleared {
                project_ref: project_ref.to_string(),
            });
        }
        removed
    }

    fn publish(&self, event: SelectionEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

impl Selections {
    fn evict_oldest(&mut self) -> Option<String> {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&oldest);
        Some(oldest)
    }
}
