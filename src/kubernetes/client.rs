// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Kubeconfig-backed accounts.
//!
//! Each context in the local kubeconfig is treated as a deployment
//! account. The pool caches one client per account plus the discovered
//! account details (namespaces and kind registry) behind a TTL, and
//! implements the two service contracts the selector controller consumes.

use anyhow::{Context as _, Result, anyhow};
use async_trait::async_trait;
use futures::future::join_all;
use kube::api::{DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, ResourceExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::progress::ProgressHandle;
use crate::search::{AccountDetails, AccountDirectory, KindSearchHit, KindSearchService};
use crate::selector::record::pack_manifest_name;

use super::discovery::{KindRegistry, discover_kinds, list_namespaces};

/// The only provider this backend serves.
pub const KUBERNETES_PROVIDER: &str = "kubernetes";

/// How long discovered account details stay fresh before auto-refresh
const DETAILS_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Timeout for connecting to a cluster API
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading cluster API responses
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Cached discovery results with timestamp
struct CachedDetails {
    namespaces: Vec<String>,
    registry: KindRegistry,
    discovered_at: Instant,
}

impl CachedDetails {
    fn new(namespaces: Vec<String>, registry: KindRegistry) -> Self {
        Self {
            namespaces,
            registry,
            discovered_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.discovered_at.elapsed() > DETAILS_TTL
    }
}

/// Connection pool treating kubeconfig contexts as accounts.
/// Caches clients and discovered details by account name.
pub struct AccountPool {
    kubeconfig: Kubeconfig,
    clients: Arc<RwLock<HashMap<String, Client>>>,
    details: Arc<RwLock<HashMap<String, CachedDetails>>>,
    /// Progress reporter for connection/discovery/search status updates
    progress: ProgressHandle,
}

impl AccountPool {
    /// Create a pool from the local kubeconfig without connecting
    /// (fast, no I/O). Clients are created lazily per account.
    pub fn new(progress: ProgressHandle) -> Result<Self> {
        let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;
        Ok(Self {
            kubeconfig,
            clients: Arc::new(RwLock::new(HashMap::new())),
            details: Arc::new(RwLock::new(HashMap::new())),
            progress,
        })
    }

    /// Names of the accounts (kubeconfig contexts) this pool serves.
    pub fn account_names(&self) -> Vec<String> {
        self.kubeconfig
            .contexts
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Get the progress reporter handle for subscribing to updates
    pub fn progress(&self) -> &ProgressHandle {
        &self.progress
    }

    /// Get or create a client for the given account
    async fn get_or_create_client(&self, account: &str) -> Result<Client> {
        {
            let clients = self.clients.read().await;
            if let Some(client) = clients.get(account) {
                return Ok(client.clone());
            }
        }

        if !self.kubeconfig.contexts.iter().any(|c| c.name == account) {
            return Err(anyhow!("Account '{}' not found in kubeconfig", account));
        }

        self.progress.connecting(account);
        let start = Instant::now();

        let mut config = Config::from_custom_kubeconfig(
            self.kubeconfig.clone(),
            &KubeConfigOptions {
                context: Some(account.to_string()),
                ..Default::default()
            },
        )
        .await
        .with_context(|| format!("Failed to load kubeconfig for account '{}'", account))?;

        config.connect_timeout = Some(CONNECT_TIMEOUT);
        config.read_timeout = Some(READ_TIMEOUT);

        let client = Client::try_from(config)
            .with_context(|| format!("Failed to create client for account '{}'", account))?;

        self.progress
            .connected(account, start.elapsed().as_millis() as u64);

        {
            let mut clients = self.clients.write().await;
            clients.insert(account.to_string(), client.clone());
        }

        Ok(client)
    }

    /// Discover (or re-use cached) namespaces and kinds for an account.
    async fn details_for(&self, account: &str) -> Result<AccountDetails> {
        {
            let details = self.details.read().await;
            if let Some(cached) = details.get(account)
                && !cached.is_expired()
            {
                return Ok(AccountDetails {
                    name: account.to_string(),
                    namespaces: cached.namespaces.clone(),
                    kind_map: cached.registry.kind_map(),
                });
            }
        }

        let client = self.get_or_create_client(account).await?;

        self.progress.discovering(account);
        let start = Instant::now();

        let namespaces = list_namespaces(&client).await?;
        let registry = discover_kinds(&client).await?;

        self.progress.discovery_complete(
            account,
            namespaces.len(),
            registry.len(),
            start.elapsed().as_millis() as u64,
        );
        debug!(
            account = %account,
            namespaces = namespaces.len(),
            kinds = registry.len(),
            "Account discovery complete"
        );

        let result = AccountDetails {
            name: account.to_string(),
            namespaces: namespaces.clone(),
            kind_map: registry.kind_map(),
        };

        {
            let mut details = self.details.write().await;
            details.insert(account.to_string(), CachedDetails::new(namespaces, registry));
        }

        Ok(result)
    }

    /// The cached kind registry for an account, discovering if needed.
    async fn registry_for(&self, account: &str) -> Result<KindRegistry> {
        self.details_for(account).await?;
        let details = self.details.read().await;
        details
            .get(account)
            .map(|c| c.registry.clone())
            .ok_or_else(|| anyhow!("No kind registry for account '{}'", account))
    }
}

#[async_trait]
impl AccountDirectory for AccountPool {
    /// Discover all accounts concurrently. An account whose cluster is
    /// unreachable is logged and skipped rather than failing the listing.
    async fn account_details(&self, provider: &str) -> Result<Vec<AccountDetails>> {
        if provider != KUBERNETES_PROVIDER {
            debug!(provider = %provider, "Unknown provider, returning no accounts");
            return Ok(Vec::new());
        }

        let names = self.account_names();
        let lookups = join_all(names.iter().map(|name| self.details_for(name))).await;

        let mut accounts = Vec::with_capacity(names.len());
        for (name, result) in names.iter().zip(lookups) {
            match result {
                Ok(details) => accounts.push(details),
                Err(e) => {
                    warn!(account = %name, error = %e, "Skipping unreachable account");
                }
            }
        }
        Ok(accounts)
    }
}

#[async_trait]
impl KindSearchService for AccountPool {
    /// List the resources of `kind` in `namespace` on `account`, returning
    /// hits whose names follow the `"<kind> <name>"` convention.
    async fn search(
        &self,
        kind: &str,
        namespace: &str,
        account: &str,
    ) -> Result<Vec<KindSearchHit>> {
        // An incomplete triple cannot match anything; the selector pushes
        // triples on every edit, including before all fields are filled.
        if kind.is_empty() || namespace.is_empty() || account.is_empty() {
            return Ok(Vec::new());
        }

        let registry = self.registry_for(account).await?;
        let info = registry
            .get(kind)
            .ok_or_else(|| anyhow!("Unknown kind '{}' on account '{}'", kind, account))?;
        if !info.namespaced {
            return Err(anyhow!("Kind '{}' is not namespace-scoped", kind));
        }

        debug!(
            kind = %info.api_resource.kind,
            group = %info.api_resource.group,
            version = %info.api_resource.version,
            namespace = %namespace,
            account = %account,
            "Searching resources"
        );

        let client = self.get_or_create_client(account).await?;
        let api: Api<DynamicObject> = Api::namespaced_with(client, namespace, &info.api_resource);
        let list = api
            .list(&ListParams::default())
            .await
            .with_context(|| {
                format!(
                    "Failed to list {} in {}/{}",
                    info.api_resource.plural, account, namespace
                )
            })?;

        Ok(list
            .items
            .iter()
            .map(|item| KindSearchHit {
                name: pack_manifest_name(Some(&info.api_resource.kind), &item.name_any()),
                account: account.to_string(),
                namespace: namespace.to_string(),
            })
            .collect())
    }
}
