// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! The selector controller: single owner of the [`Selector`] record.
//!
//! All editing goes through the setters here. Each setter mutates the
//! record (dispatching through the active mode behavior where the storage
//! convention differs), re-derives the dependent view lists, notifies the
//! owner callback, and re-submits the search pipeline when the change could
//! affect candidate results.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::Application;
use crate::progress::ProgressHandle;
use crate::search::pipeline::{SearchPipeline, SearchQuery, SearchState};
use crate::search::service::{AccountDetails, AccountDirectory, KindSearchService};

use super::modes::behavior_for;
use super::record::{Selector, SelectorMode, is_expression, pack_manifest_name};

/// Owner callback, invoked synchronously after every selector mutation.
pub type OnChange = Box<dyn Fn(&Selector) + Send + Sync>;

/// Edits a [`Selector`] against a directory of accounts and a candidate
/// search pipeline. Construction fetches the account details once; the
/// editing session then runs entirely against that snapshot plus the
/// latest-wins pipeline.
pub struct SelectorController {
    selector: Selector,
    accounts: Vec<AccountDetails>,
    allowed_logical_kinds: Option<Vec<String>>,
    application: Option<Application>,
    pipeline: SearchPipeline,
    on_change: OnChange,

    // View state derived from the selector + account snapshot.
    namespaces: Vec<String>,
    kinds: Vec<String>,
    clusters: Vec<String>,

    last_search: Option<JoinHandle<()>>,
}

impl SelectorController {
    /// Build a controller for `selector`, fetching account details for
    /// `provider` and submitting the initial candidate search.
    #[allow(clippy::too_many_arguments)]
    pub async fn new(
        selector: Selector,
        provider: &str,
        directory: Arc<dyn AccountDirectory>,
        service: Arc<dyn KindSearchService>,
        progress: ProgressHandle,
        application: Option<Application>,
        allowed_logical_kinds: Option<Vec<String>>,
        on_change: OnChange,
    ) -> Result<Self> {
        let accounts = directory.account_details(provider).await?;
        debug!(provider = %provider, accounts = accounts.len(), "Loaded account directory");

        let mut controller = Self {
            selector,
            accounts,
            allowed_logical_kinds,
            application,
            pipeline: SearchPipeline::new(service, progress),
            on_change,
            namespaces: Vec::new(),
            kinds: Vec::new(),
            clusters: Vec::new(),
            last_search: None,
        };
        controller.derive_lists();
        controller.derive_clusters();
        controller.trigger_search().await;
        Ok(controller)
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Names of the accounts known to the directory.
    pub fn account_names(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.name.clone()).collect()
    }

    /// Namespaces offered by the selected account.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Kinds offered by the selected account, after allow-list filtering.
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    /// Clusters selectable in dynamic mode, from the supplied application.
    pub fn clusters(&self) -> &[String] {
        &self.clusters
    }

    /// Kind currently in effect, read through the active mode's convention.
    pub fn current_kind(&self) -> Option<String> {
        behavior_for(self.selector.mode).current_kind(&self.selector)
    }

    /// Snapshot of the candidate search state.
    pub async fn search_state(&self) -> SearchState {
        self.pipeline.state().await
    }

    /// Wait for the most recently submitted candidate search to land.
    pub async fn await_search(&mut self) {
        if let Some(handle) = self.last_search.take() {
            let _ = handle.await;
        }
    }

    /// End the editing session: no further search completion is applied.
    pub fn close(&self) {
        self.pipeline.close();
    }

    /// Switch the selector between static and dynamic identification,
    /// migrating field state between the two storage conventions.
    pub async fn set_mode(&mut self, mode: SelectorMode) {
        if self.selector.mode == mode {
            return;
        }
        debug!(mode = %mode.as_str(), "Switching selector mode");
        self.selector.mode = mode;
        behavior_for(mode).on_mode_activated(&mut self.selector);
        self.derive_clusters();
        self.notify();
    }

    /// Select an account: recompute the namespace/kind lists and clear a
    /// now-invalid namespace, then re-search.
    pub async fn set_account(&mut self, account: &str) {
        self.selector.account = account.to_string();
        self.derive_lists();

        if let Some(namespace) = self.selector.location.clone()
            && !is_expression(&namespace)
            && !self.namespaces.contains(&namespace)
        {
            debug!(namespace = %namespace, account = %account, "Namespace not in account, clearing");
            self.selector.location = None;
        }

        self.derive_clusters();
        self.notify();
        self.trigger_search().await;
    }

    pub async fn set_namespace(&mut self, namespace: &str) {
        self.selector.location = Some(namespace.to_string());
        self.derive_clusters();
        self.notify();
        self.trigger_search().await;
    }

    /// Store a kind change through the active mode's convention.
    pub async fn set_kind(&mut self, kind: &str) {
        behavior_for(self.selector.mode).on_kind_changed(&mut self.selector, kind);
        self.derive_clusters();
        self.notify();
        self.trigger_search().await;
    }

    /// Pick a resource name (static mode only): re-pack the manifest name
    /// preserving the current kind. Does not affect the search triple.
    pub async fn set_name(&mut self, name: &str) {
        if self.selector.mode != SelectorMode::Static {
            warn!("Ignoring name change outside static mode");
            return;
        }
        let kind = self.current_kind();
        self.selector.manifest_name = pack_manifest_name(kind.as_deref(), name);
        self.pipeline.select(Some(name.to_string())).await;
        self.notify();
    }

    /// Pick a cluster (dynamic mode only).
    pub fn set_cluster(&mut self, cluster: &str) {
        if self.selector.mode != SelectorMode::Dynamic {
            warn!("Ignoring cluster change outside dynamic mode");
            return;
        }
        self.selector.cluster = cluster.to_string();
        self.notify();
    }

    /// Set the resolution criteria (dynamic mode only).
    pub fn set_criteria(&mut self, criteria: &str) {
        if self.selector.mode != SelectorMode::Dynamic {
            warn!("Ignoring criteria change outside dynamic mode");
            return;
        }
        self.selector.criteria = criteria.to_string();
        self.notify();
    }

    fn notify(&self) {
        (self.on_change)(&self.selector);
    }

    /// Recompute the namespace and kind lists from the selected account's
    /// details. An unknown account yields empty lists.
    fn derive_lists(&mut self) {
        let details = self
            .accounts
            .iter()
            .find(|a| a.name == self.selector.account);
        match details {
            Some(details) => {
                self.namespaces = details.namespaces.clone();
                self.namespaces.sort();
                self.kinds = details.kinds(self.allowed_logical_kinds.as_deref());
            }
            None => {
                self.namespaces.clear();
                self.kinds.clear();
            }
        }
    }

    fn derive_clusters(&mut self) {
        self.clusters = match (&self.application, self.current_kind()) {
            (Some(app), Some(kind)) => app.clusters(
                &self.selector.account,
                self.selector.location.as_deref().unwrap_or_default(),
                &kind,
            ),
            _ => Vec::new(),
        };
    }

    /// Push the current `(kind, namespace, account)` triple into the
    /// latest-wins pipeline.
    async fn trigger_search(&mut self) {
        let query = SearchQuery {
            kind: self.current_kind().unwrap_or_default(),
            namespace: self.selector.location.clone().unwrap_or_default(),
            account: self.selector.account.clone(),
        };
        self.last_search = self.pipeline.submit(query).await;
    }
}
