// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Resource discovery for Kubernetes accounts.
//!
//! Builds the per-account kind registry the selector edits against: core
//! resources come from k8s-openapi (instant, no I/O), CRDs are discovered
//! at runtime through the Kubernetes discovery API. Each kind carries the
//! logical kind it is classified as, which the selector's allow-list
//! filtering operates on.

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::discovery::{ApiResource, Discovery, Scope};
use kube::{Api, Client};
use std::collections::{BTreeMap, HashMap};

/// Logical kind vocabulary used for classification.
///
/// This is a hardcoded registry: the orchestration platform's grouping of
/// resource kinds is a product convention, not something the Kubernetes
/// API exposes. Kinds absent from the table are `unclassified`.
pub const LOGICAL_SERVER_GROUPS: &str = "serverGroups";
pub const LOGICAL_SERVER_GROUP_MANAGERS: &str = "serverGroupManagers";
pub const LOGICAL_LOAD_BALANCERS: &str = "loadBalancers";
pub const LOGICAL_SECURITY_GROUPS: &str = "securityGroups";
pub const LOGICAL_INSTANCES: &str = "instances";
pub const LOGICAL_CONFIGS: &str = "configs";
pub const LOGICAL_UNCLASSIFIED: &str = "unclassified";

/// Classify a resource kind into its logical kind.
pub fn logical_kind(kind: &str) -> &'static str {
    match kind {
        "ReplicaSet" | "StatefulSet" | "DaemonSet" => LOGICAL_SERVER_GROUPS,
        "Deployment" => LOGICAL_SERVER_GROUP_MANAGERS,
        "Service" | "Ingress" => LOGICAL_LOAD_BALANCERS,
        "NetworkPolicy" => LOGICAL_SECURITY_GROUPS,
        "Pod" => LOGICAL_INSTANCES,
        "ConfigMap" | "Secret" => LOGICAL_CONFIGS,
        _ => LOGICAL_UNCLASSIFIED,
    }
}

/// Information about a discovered Kubernetes resource kind
#[derive(Debug, Clone)]
pub struct KindInfo {
    /// The API resource definition
    pub api_resource: ApiResource,
    /// Whether the resource is namespace-scoped
    pub namespaced: bool,
    /// Logical kind this resource is classified as
    pub logical_kind: &'static str,
    /// Whether this is a core resource (static type) or discovered (CRD)
    pub is_core: bool,
}

/// Registry of the resource kinds available on an account
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    /// Kinds indexed by lowercased kind name
    by_kind: HashMap<String, KindInfo>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind to the registry. Core kinds take priority: a discovered
    /// kind never displaces a core one of the same name.
    pub fn add(&mut self, info: KindInfo) {
        let key = info.api_resource.kind.to_lowercase();
        if let Some(existing) = self.by_kind.get(&key)
            && existing.is_core
            && !info.is_core
        {
            return;
        }
        self.by_kind.insert(key, info);
    }

    /// Look up a kind, case-insensitively.
    pub fn get(&self, kind: &str) -> Option<&KindInfo> {
        self.by_kind.get(&kind.to_lowercase())
    }

    /// Map of kind name to logical kind, as served to the selector.
    pub fn kind_map(&self) -> BTreeMap<String, String> {
        self.by_kind
            .values()
            .map(|info| {
                (
                    info.api_resource.kind.clone(),
                    info.logical_kind.to_string(),
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

/// Build a registry with just core resources using k8s-openapi types
/// (no discovery, instant startup).
pub fn build_core_registry() -> KindRegistry {
    use k8s_openapi::api::{
        apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet},
        batch::v1::{CronJob, Job},
        core::v1::{ConfigMap, Pod, Secret, Service},
        networking::v1::{Ingress, NetworkPolicy},
    };
    use kube::Resource;

    let mut registry = KindRegistry::new();

    // Uses compile-time type info from k8s-openapi via the kube::Resource
    // trait, so the registry stays in sync with the built-against API
    // version. All core selectable kinds are namespaced.
    macro_rules! add_core {
        ($type:ty) => {{
            let kind = <$type>::kind(&()).to_string();
            registry.add(KindInfo {
                api_resource: ApiResource {
                    group: <$type>::group(&()).to_string(),
                    version: <$type>::version(&()).to_string(),
                    api_version: <$type>::api_version(&()).to_string(),
                    kind: kind.clone(),
                    plural: <$type>::plural(&()).to_string(),
                },
                namespaced: true,
                logical_kind: logical_kind(&kind),
                is_core: true,
            });
        }};
    }

    add_core!(Pod);
    add_core!(Service);
    add_core!(ConfigMap);
    add_core!(Secret);
    add_core!(Deployment);
    add_core!(ReplicaSet);
    add_core!(StatefulSet);
    add_core!(DaemonSet);
    add_core!(Job);
    add_core!(CronJob);
    add_core!(Ingress);
    add_core!(NetworkPolicy);

    registry
}

/// Discover all resource kinds on a cluster: core registry plus whatever
/// the discovery API reports (CRDs included).
pub async fn discover_kinds(client: &Client) -> Result<KindRegistry> {
    let mut registry = build_core_registry();

    let discovery = Discovery::new(client.clone())
        .run()
        .await
        .context("Failed to run API discovery")?;

    for group in discovery.groups() {
        for (ar, caps) in group.recommended_resources() {
            registry.add(KindInfo {
                namespaced: caps.scope == Scope::Namespaced,
                logical_kind: logical_kind(&ar.kind),
                api_resource: ar,
                is_core: false,
            });
        }
    }

    Ok(registry)
}

/// List the namespaces visible on a cluster, sorted.
pub async fn list_namespaces(client: &Client) -> Result<Vec<String>> {
    use kube::ResourceExt;
    use kube::api::ListParams;

    let api: Api<Namespace> = Api::all(client.clone());
    let list = api
        .list(&ListParams::default())
        .await
        .context("Failed to list namespaces")?;

    let mut names: Vec<String> = list.items.iter().map(|ns| ns.name_any()).collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_kind_classification() {
        assert_eq!(logical_kind("ReplicaSet"), LOGICAL_SERVER_GROUPS);
        assert_eq!(logical_kind("Deployment"), LOGICAL_SERVER_GROUP_MANAGERS);
        assert_eq!(logical_kind("Service"), LOGICAL_LOAD_BALANCERS);
        assert_eq!(logical_kind("NetworkPolicy"), LOGICAL_SECURITY_GROUPS);
        assert_eq!(logical_kind("Pod"), LOGICAL_INSTANCES);
        assert_eq!(logical_kind("ConfigMap"), LOGICAL_CONFIGS);
        assert_eq!(logical_kind("SomeCustomThing"), LOGICAL_UNCLASSIFIED);
    }

    #[test]
    fn test_core_registry_contents() {
        let registry = build_core_registry();
        assert!(!registry.is_empty());
        assert!(registry.get("Deployment").is_some());
        assert!(registry.get("deployment").is_some());
        assert!(registry.get("DoesNotExist").is_none());

        let info = registry.get("ReplicaSet").unwrap();
        assert!(info.is_core);
        assert!(info.namespaced);
        assert_eq!(info.logical_kind, LOGICAL_SERVER_GROUPS);
        assert_eq!(info.api_resource.plural, "replicasets");
    }

    #[test]
    fn test_discovered_kind_never_displaces_core() {
        let mut registry = build_core_registry();
        let core_group = registry.get("Deployment").unwrap().api_resource.group.clone();

        registry.add(KindInfo {
            api_resource: ApiResource {
                group: "example.io".to_string(),
                version: "v1".to_string(),
                api_version: "example.io/v1".to_string(),
                kind: "Deployment".to_string(),
                plural: "deployments".to_string(),
            },
            namespaced: true,
            logical_kind: LOGICAL_UNCLASSIFIED,
            is_core: false,
        });

        assert_eq!(
            registry.get("Deployment").unwrap().api_resource.group,
            core_group
        );
    }

    #[test]
    fn test_kind_map_uses_original_casing() {
        let registry = build_core_registry();
        let map = registry.kind_map();
        assert_eq!(map.get("Deployment").map(String::as_str), Some(LOGICAL_SERVER_GROUP_MANAGERS));
        assert!(!map.contains_key("deployment"));
    }
}
