// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Latest-wins candidate search.
//!
//! The pipeline accepts `(kind, namespace, account)` triples and keeps a
//! list of candidate resource names in sync with the most recent one. Each
//! submission is stamped with a monotonically increasing generation; a
//! lookup whose generation is no longer current has its result discarded
//! entirely, so an older request can never overwrite the state produced by
//! a newer one, regardless of wall-clock completion order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::progress::ProgressHandle;
use crate::selector::record::{is_expression, parse_manifest_name};

use super::service::KindSearchService;

/// The triple a candidate lookup is keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub kind: String,
    pub namespace: String,
    pub account: String,
}

/// Shared view state the pipeline maintains.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// True from submission until the current lookup lands.
    pub loading: bool,
    /// Short names of the candidates, lexicographically sorted.
    pub candidates: Vec<String>,
    /// Currently selected short name. Set to the empty-string placeholder
    /// after a completed lookup when nothing is selected, so downstream
    /// rendering always has a defined value.
    pub selected: Option<String>,
    /// Message of the most recent failed lookup, cleared on success. The
    /// candidate list from before the failure is left intact.
    pub last_error: Option<String>,
}

/// Debounced, cancellable candidate lookup keyed on the latest submitted
/// triple. Closing the pipeline stops all further state updates.
pub struct SearchPipeline {
    service: Arc<dyn KindSearchService>,
    progress: ProgressHandle,
    state: Arc<RwLock<SearchState>>,
    generation: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl SearchPipeline {
    pub fn new(service: Arc<dyn KindSearchService>, progress: ProgressHandle) -> Self {
        Self {
            service,
            progress,
            state: Arc::new(RwLock::new(SearchState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Snapshot of the current search state.
    pub async fn state(&self) -> SearchState {
        self.state.read().await.clone()
    }

    /// Mark a name as selected. `None` reverts to "nothing selected" (the
    /// next completed lookup will re-select the placeholder).
    pub async fn select(&self, name: Option<String>) {
        self.state.write().await.selected = name;
    }

    /// Tear the pipeline down. Pending lookups keep running but their
    /// results are never applied, and later submissions are ignored.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Submit a new triple, superseding any in-flight lookup.
    ///
    /// The loading flag is set before this returns; the lookup itself runs
    /// on a spawned task whose handle is returned so callers can await
    /// completion of *this* submission (a superseded submission's task
    /// still finishes, it just applies nothing).
    pub async fn submit(&self, query: SearchQuery) -> Option<JoinHandle<()>> {
        if self.is_closed() {
            debug!(?query, "Search pipeline closed, dropping submission");
            return None;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            kind = %query.kind,
            namespace = %query.namespace,
            account = %query.account,
            generation,
            "Submitting candidate search"
        );
        self.state.write().await.loading = true;

        let service = Arc::clone(&self.service);
        let progress = Arc::clone(&self.progress);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let closed = Arc::clone(&self.closed);

        Some(tokio::spawn(async move {
            // Templated accounts are never resolved at edit time; yield an
            // empty candidate list without calling out.
            let outcome = if is_expression(&query.account) {
                debug!(account = %query.account, "Account is a templated expression, skipping lookup");
                Ok(Vec::new())
            } else {
                progress.search_started(&query.kind, &query.namespace, &query.account);
                let start = std::time::Instant::now();
                let result = service
                    .search(&query.kind, &query.namespace, &query.account)
                    .await;
                match &result {
                    Ok(hits) => {
                        progress.search_complete(hits.len(), start.elapsed().as_millis() as u64)
                    }
                    Err(e) => progress.search_failed(&e.to_string()),
                }
                result.map(|hits| {
                    let mut names: Vec<String> = hits
                        .iter()
                        .map(|hit| parse_manifest_name(&hit.name).name)
                        .collect();
                    names.sort();
                    names
                })
            };

            if closed.load(Ordering::SeqCst) {
                return;
            }
            let mut state = state.write().await;
            // Stale-result discard: only the latest submitted triple may
            // touch the state. Re-checked under the write lock.
            if current.load(Ordering::SeqCst) != generation {
                debug!(generation, "Discarding superseded search result");
                return;
            }
            state.loading = false;
            match outcome {
                Ok(names) => {
                    state.candidates = names;
                    state.last_error = None;
                    if state.selected.is_none() {
                        state.selected = Some(String::new());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Candidate search failed");
                    state.last_error = Some(e.to_string());
                }
            }
        }))
    }
}
