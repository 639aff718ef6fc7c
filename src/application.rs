// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Application context for dynamic-mode cluster enumeration.
//!
//! Dynamic selectors pick a cluster out of the owning application's server
//! groups. The application is supplied by the caller (typically loaded from
//! a JSON export); this module only filters it, it never fetches it.

use serde::{Deserialize, Serialize};

/// A deployed server group within an application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerGroup {
    pub name: String,
    pub account: String,
    /// Namespace the group runs in (the upstream record calls this region).
    pub region: String,
    /// Resource kind backing the group (e.g. `replicaSet`).
    pub kind: String,
    /// Cluster the group belongs to.
    pub cluster: String,
    /// Managers (e.g. a deployment) driving this group. Groups with a
    /// manager attached are not directly selectable.
    #[serde(default)]
    pub server_group_managers: Vec<String>,
}

/// Caller-supplied application state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub name: String,
    pub server_groups: Vec<ServerGroup>,
}

impl Application {
    /// Load an application export from a JSON file.
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read application file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse application file: {}", path.display()))
    }

    /// Clusters selectable for the given account + namespace + kind:
    /// the distinct clusters of matching server groups that have no
    /// server-group manager attached, sorted.
    ///
    /// Kind matching is case-insensitive; upstream exports carry camelCase
    /// kinds (`replicaSet`) while the selector edits PascalCase ones.
    pub fn clusters(&self, account: &str, namespace: &str, kind: &str) -> Vec<String> {
        let mut clusters: Vec<String> = self
            .server_groups
            .iter()
            .filter(|sg| {
                sg.account == account
                    && sg.region == namespace
                    && sg.kind.eq_ignore_ascii_case(kind)
                    && sg.server_group_managers.is_empty()
            })
            .map(|sg| sg.cluster.clone())
            .collect();
        clusters.sort();
        clusters.dedup();
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(cluster: &str, account: &str, region: &str, kind: &str) -> ServerGroup {
        ServerGroup {
            name: format!("{} v001", kind),
            account: account.to_string(),
            region: region.to_string(),
            kind: kind.to_string(),
            cluster: cluster.to_string(),
            server_group_managers: Vec::new(),
        }
    }

    fn app() -> Application {
        Application {
            name: "billing".to_string(),
            server_groups: vec![
                group("billing-api", "prod", "default", "replicaSet"),
                group("billing-api", "prod", "default", "replicaSet"),
                group("billing-worker", "prod", "default", "replicaSet"),
                group("billing-api", "staging", "default", "replicaSet"),
                group("billing-api", "prod", "other-ns", "replicaSet"),
                group("billing-cron", "prod", "default", "statefulSet"),
            ],
        }
    }

    #[test]
    fn test_clusters_filtered_by_account_namespace_kind() {
        let clusters = app().clusters("prod", "default", "ReplicaSet");
        assert_eq!(clusters, vec!["billing-api", "billing-worker"]);
    }

    #[test]
    fn test_clusters_deduplicated_and_sorted() {
        let clusters = app().clusters("prod", "default", "replicaSet");
        assert_eq!(clusters.iter().filter(|c| *c == "billing-api").count(), 1);
    }

    #[test]
    fn test_managed_groups_are_excluded() {
        let mut app = app();
        for sg in &mut app.server_groups {
            if sg.cluster == "billing-worker" {
                sg.server_group_managers = vec!["deployment billing-worker".to_string()];
            }
        }
        let clusters = app.clusters("prod", "default", "replicaSet");
        assert_eq!(clusters, vec!["billing-api"]);
    }

    #[test]
    fn test_no_matches_yields_empty() {
        assert!(app().clusters("prod", "default", "daemonSet").is_empty());
        assert!(app().clusters("missing", "default", "replicaSet").is_empty());
    }

    #[test]
    fn test_application_deserializes_camel_case() {
        let app: Application = serde_json::from_str(
            r#"{
                "name": "billing",
                "serverGroups": [{
                    "name": "replicaSet v001",
                    "account": "prod",
                    "region": "default",
                    "kind": "replicaSet",
                    "cluster": "billing-api",
                    "serverGroupManagers": []
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(app.server_groups.len(), 1);
        assert_eq!(app.server_groups[0].cluster, "billing-api");
    }
}
