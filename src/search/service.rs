// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Service contracts consumed by the selector controller.
//!
//! The controller never talks to a cluster directly; it depends on an
//! [`AccountDirectory`] for account/namespace/kind discovery and a
//! [`KindSearchService`] for candidate lookups. The kubeconfig-backed
//! implementations live in `crate::kubernetes`; tests use in-memory fakes.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only description of a deployment account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    /// Account name (for the kubeconfig backend, the context name).
    pub name: String,
    /// Namespaces available in the account.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Map of resource kind to the logical kind it is classified as
    /// (e.g. `Deployment` -> `serverGroups`).
    #[serde(default)]
    pub kind_map: BTreeMap<String, String>,
}

impl AccountDetails {
    /// Kinds offered by this account, sorted, optionally restricted to an
    /// allow-list of logical kinds.
    pub fn kinds(&self, allowed_logical_kinds: Option<&[String]>) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .kind_map
            .iter()
            .filter(|(_, logical)| match allowed_logical_kinds {
                Some(allowed) => allowed.iter().any(|a| a == *logical),
                None => true,
            })
            .map(|(kind, _)| kind.clone())
            .collect();
        kinds.sort();
        kinds
    }
}

/// A single hit from a kind search.
///
/// `name` follows the `"<kind> <name>"` manifest-name convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSearchHit {
    pub name: String,
    pub account: String,
    pub namespace: String,
}

/// Directory of deployment accounts for a cloud provider.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// List the accounts known for `provider`, with their namespaces and
    /// kind classification. Unknown providers yield an empty list.
    async fn account_details(&self, provider: &str) -> Result<Vec<AccountDetails>>;
}

/// Lookup of resources of a kind within an account namespace.
#[async_trait]
pub trait KindSearchService: Send + Sync {
    /// Find all resources of `kind` in `namespace` on `account`.
    async fn search(&self, kind: &str, namespace: &str, account: &str)
    -> Result<Vec<KindSearchHit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> AccountDetails {
        AccountDetails {
            name: "prod".to_string(),
            namespaces: vec!["default".to_string(), "kube-system".to_string()],
            kind_map: BTreeMap::from([
                ("Deployment".to_string(), "serverGroups".to_string()),
                ("ReplicaSet".to_string(), "serverGroups".to_string()),
                ("Service".to_string(), "loadBalancers".to_string()),
                ("ConfigMap".to_string(), "configs".to_string()),
            ]),
        }
    }

    #[test]
    fn test_kinds_unfiltered_are_sorted() {
        assert_eq!(
            details().kinds(None),
            vec!["ConfigMap", "Deployment", "ReplicaSet", "Service"]
        );
    }

    #[test]
    fn test_kinds_filtered_by_logical_kind() {
        let allowed = vec!["serverGroups".to_string()];
        assert_eq!(details().kinds(Some(&allowed)), vec!["Deployment", "ReplicaSet"]);
    }

    #[test]
    fn test_kinds_empty_allow_list_filters_everything() {
        let allowed: Vec<String> = vec![];
        assert!(details().kinds(Some(&allowed)).is_empty());
    }
}
