// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Progress reporting for long-running operations
//!
//! Provides a way for the account pool and the search pipeline to report
//! progress, which the REPL can display to the user.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

/// Create a spinner with consistent styling
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Progress update message
#[derive(Clone, Debug)]
pub enum ProgressUpdate {
    // === Connection/Discovery phases ===
    /// Connecting to an account's cluster
    Connecting { account: String },
    /// Connected to an account's cluster
    Connected { account: String, elapsed_ms: u64 },
    /// Discovering namespaces and kinds on an account
    Discovering { account: String },
    /// Discovery complete for an account
    DiscoveryComplete {
        account: String,
        namespace_count: usize,
        kind_count: usize,
        elapsed_ms: u64,
    },

    // === Candidate search phases ===
    /// A candidate lookup was dispatched
    SearchStarted {
        kind: String,
        namespace: String,
        account: String,
    },
    /// A candidate lookup landed
    SearchComplete { hits: usize, elapsed_ms: u64 },
    /// A candidate lookup failed
    SearchFailed { error: String },
}

/// Global progress reporter
pub struct ProgressReporter {
    sender: broadcast::Sender<ProgressUpdate>,
    /// Count of lookups dispatched since creation
    searches_started: AtomicUsize,
    /// Count of lookups that landed (successfully or not)
    searches_finished: AtomicUsize,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self {
            sender,
            searches_started: AtomicUsize::new(0),
            searches_finished: AtomicUsize::new(0),
        }
    }

    /// Subscribe to progress updates
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdate> {
        self.sender.subscribe()
    }

    /// Report connecting to an account
    pub fn connecting(&self, account: &str) {
        let _ = self.sender.send(ProgressUpdate::Connecting {
            account: account.to_string(),
        });
    }

    /// Report connected to an account
    pub fn connected(&self, account: &str, elapsed_ms: u64) {
        let _ = self.sender.send(ProgressUpdate::Connected {
            account: account.to_string(),
            elapsed_ms,
        });
    }

    /// Report discovery starting on an account
    pub fn discovering(&self, account: &str) {
        let _ = self.sender.send(ProgressUpdate::Discovering {
            account: account.to_string(),
        });
    }

    /// Report discovery complete for an account
    pub fn discovery_complete(
        &self,
        account: &str,
        namespace_count: usize,
        kind_count: usize,
        elapsed_ms: u64,
    ) {
        let _ = self.sender.send(ProgressUpdate::DiscoveryComplete {
            account: account.to_string(),
            namespace_count,
            kind_count,
            elapsed_ms,
        });
    }

    /// Report a candidate lookup being dispatched
    pub fn search_started(&self, kind: &str, namespace: &str, account: &str) {
        self.searches_started.fetch_add(1, Ordering::SeqCst);
        let _ = self.sender.send(ProgressUpdate::SearchStarted {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            account: account.to_string(),
        });
    }

    /// Report a candidate lookup landing
    pub fn search_complete(&self, hits: usize, elapsed_ms: u64) {
        self.searches_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .sender
            .send(ProgressUpdate::SearchComplete { hits, elapsed_ms });
    }

    /// Report a candidate lookup failing
    pub fn search_failed(&self, error: &str) {
        self.searches_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self.sender.send(ProgressUpdate::SearchFailed {
            error: error.to_string(),
        });
    }

    /// Get current lookup counters (finished/started)
    pub fn searches(&self) -> (usize, usize) {
        (
            self.searches_finished.load(Ordering::SeqCst),
            self.searches_started.load(Ordering::SeqCst),
        )
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to progress reporter
pub type ProgressHandle = Arc<ProgressReporter>;

/// Create a new progress reporter handle
pub fn create_progress_handle() -> ProgressHandle {
    Arc::new(ProgressReporter::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reporter_new() {
        let reporter = ProgressReporter::new();
        assert_eq!(reporter.searches(), (0, 0));
    }

    #[test]
    fn test_search_counters() {
        let reporter = ProgressReporter::new();
        reporter.search_started("Deployment", "default", "prod");
        assert_eq!(reporter.searches(), (0, 1));

        reporter.search_complete(4, 120);
        assert_eq!(reporter.searches(), (1, 1));

        reporter.search_started("Service", "default", "prod");
        reporter.search_failed("connection refused");
        assert_eq!(reporter.searches(), (2, 2));
    }

    #[test]
    fn test_subscribe_receives_updates() {
        let reporter = ProgressReporter::new();
        let mut receiver = reporter.subscribe();

        reporter.search_started("Deployment", "default", "prod");

        let update = receiver.try_recv().unwrap();
        match update {
            ProgressUpdate::SearchStarted {
                kind,
                namespace,
                account,
            } => {
                assert_eq!(kind, "Deployment");
                assert_eq!(namespace, "default");
                assert_eq!(account, "prod");
            }
            _ => panic!("Expected SearchStarted update"),
        }
    }

    #[test]
    fn test_multiple_updates() {
        let reporter = ProgressReporter::new();
        let mut receiver = reporter.subscribe();

        reporter.connecting("prod");
        reporter.connected("prod", 50);
        reporter.discovering("prod");
        reporter.discovery_complete("prod", 12, 40, 200);
        reporter.search_started("Deployment", "default", "prod");
        reporter.search_complete(3, 80);

        let updates: Vec<_> = std::iter::from_fn(|| receiver.try_recv().ok()).collect();
        assert_eq!(updates.len(), 6);

        assert!(matches!(updates[0], ProgressUpdate::Connecting { .. }));
        assert!(matches!(updates[1], ProgressUpdate::Connected { .. }));
        assert!(matches!(updates[2], ProgressUpdate::Discovering { .. }));
        assert!(matches!(
            updates[3],
            ProgressUpdate::DiscoveryComplete { .. }
        ));
        assert!(matches!(updates[4], ProgressUpdate::SearchStarted { .. }));
        assert!(matches!(updates[5], ProgressUpdate::SearchComplete { .. }));
    }

    #[test]
    fn test_create_progress_handle() {
        let handle = create_progress_handle();
        assert_eq!(handle.searches(), (0, 0));
    }
}
