// Warm-up orchestrator.
// Fetches a root entity and its dependencies ahead of need and parks the result in the single-use cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{SingleUseCache, cache_key};
use crate::config::WarmupConfig;
use crate::entity::{DependencyEntity, RootEntity, WarmupResult};
use crate::error::{Result, WarmupError};
use crate::resolver::{DependencyResolver, DependencySet, GroupKeyPrecedence};
use crate::store::{EntityStore, Preloader};

/// Counts from a single warm-up or direct load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupStats {
    /// Distinct dependency ids found in the root entity.
    pub dependencies_resolved: usize,
    /// Dependencies fetched successfully.
    pub dependencies_fetched: usize,
    /// Dependencies that failed, timed out, or were not found.
    pub dependencies_failed: usize,
}

/// Runs warm-ups against an entity store and publishes into a shared cache.
///
/// Cheap to clone; clones share the store, preloader, and cache.
#[derive(Clone)]
pub struct WarmupOrchestrator {
    store: Arc<dyn EntityStore>,
    preloader: Arc<dyn Preloader>,
    cache: SingleUseCache,
    resolver: DependencyResolver,
    config: Arc<WarmupConfig>,
}

impl WarmupOrchestrator {
    pub fn new(
        store: Arc<dyn EntityStore>,
        preloader: Arc<dyn Preloader>,
        cache: SingleUseCache,
        config: WarmupConfig,
    ) -> Self {
        let resolver = DependencyResolver::new(GroupKeyPrecedence::new(&config.group_keys));
        Self {
            store,
            preloader,
            cache,
            resolver,
            config: Arc::new(config),
        }
    }

    pub fn cache(&self) -> &SingleUseCache {
        &self.cache
    }

    pub fn config(&self) -> &WarmupConfig {
        &self.config
    }

    /// Cache key a warm-up of `root_id` at `version_id` is published under.
    pub fn cache_key(&self, root_id: &str, version_id: &str) -> String {
        cache_key(&self.config.key_namespace, root_id, version_id)
    }

    /// Best-effort warm-up. Never fails; on abort nothing is cached.
    pub async fn warm_up(&self, root_id: &str, version_id: &str) {
        match self.try_warm_up(root_id, version_id).await {
            Ok(stats) => debug!(
                root_id,
                version_id,
                fetched = stats.dependencies_fetched,
                failed = stats.dependencies_failed,
                "warm-up complete"
            ),
            Err(e) => info!(root_id, version_id, error = %e, "warm-up aborted"),
        }
    }

    /// Run `warm_up` as a detached task.
    pub fn spawn_warm_up(
        &self,
        root_id: impl Into<String>,
        version_id: impl Into<String>,
    ) -> JoinHandle<()> {
        let this = self.clone();
        let root_id = root_id.into();
        let version_id = version_id.into();
        tokio::spawn(async move { this.warm_up(&root_id, &version_id).await })
    }

    /// Warm-up that reports why it aborted. Only a root fetch failure aborts.
    pub async fn try_warm_up(&self, root_id: &str, version_id: &str) -> Result<WarmupStats> {
        self.start_preloads();
        self.start_probe();

        let (result, stats) = self.load(root_id).await?;

        let key = self.cache_key(root_id, version_id);
        self.cache.put(key.clone(), result);
        info!(
            key = %key,
            dependencies = stats.dependencies_fetched,
            "warm-up result published"
        );

        Ok(stats)
    }

    /// Claim the warmed result for `root_id` at `version_id`, if one is waiting.
    pub fn claim(&self, root_id: &str, version_id: &str) -> Option<WarmupResult> {
        self.cache.take_once(&self.cache_key(root_id, version_id))
    }

    /// Claim the warmed result, or fetch it directly on a miss.
    ///
    /// The direct path does not write to the cache.
    pub async fn claim_or_fetch(&self, root_id: &str, version_id: &str) -> Result<WarmupResult> {
        if let Some(result) = self.claim(root_id, version_id) {
            debug!(root_id, version_id, "cache hit");
            return Ok(result);
        }

        debug!(root_id, version_id, "cache miss, fetching directly");
        let (result, _) = self.load(root_id).await?;
        Ok(result)
    }

    /// Fetch the root, resolve its dependencies, and fetch those concurrently.
    async fn load(&self, root_id: &str) -> Result<(WarmupResult, WarmupStats)> {
        let root = self.fetch_root(root_id).await?;

        let ids = self.resolver.resolve(&root);
        debug!(root_id, count = ids.len(), "resolved dependencies");

        let dependencies = self.fetch_dependencies(&ids).await;
        let stats = WarmupStats {
            dependencies_resolved: ids.len(),
            dependencies_fetched: dependencies.len(),
            dependencies_failed: ids.len() - dependencies.len(),
        };

        Ok((WarmupResult { root, dependencies }, stats))
    }

    async fn fetch_root(&self, root_id: &str) -> Result<RootEntity> {
        let timeout = self.config.fetch_timeout();
        with_timeout(timeout, root_id, self.store.fetch_root(root_id))
            .await?
            .ok_or_else(|| WarmupError::NotFound(root_id.to_string()))
    }

    /// Fetch every id concurrently. Failures drop out; order follows `ids`.
    async fn fetch_dependencies(&self, ids: &DependencySet) -> Vec<DependencyEntity> {
        let timeout = self.config.fetch_timeout();
        let fetches = ids.iter().map(|id| async move {
            match with_timeout(timeout, id, self.store.fetch_dependency(id)).await {
                Ok(Some(dependency)) => Some(dependency),
                Ok(None) => {
                    warn!(dependency_id = %id, "dependency not found");
                    None
                }
                Err(e) => {
                    warn!(dependency_id = %id, error = %e, "dependency fetch failed");
                    None
                }
            }
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }

    fn start_preloads(&self) {
        for module in self.config.preload_modules.iter().cloned() {
            let preloader = Arc::clone(&self.preloader);
            tokio::spawn(async move {
                if let Err(e) = preloader.preload(&module).await {
                    warn!(module = %module, error = %e, "module preload failed");
                }
            });
        }
    }

    fn start_probe(&self) {
        let store = Arc::clone(&self.store);
        let timeout = self.config.fetch_timeout();
        tokio::spawn(async move {
            if let Err(e) = with_timeout(timeout, "probe", store.probe()).await {
                warn!(error = %e, "store probe failed");
            }
        });
    }
}

/// Bound a store call by `timeout`, mapping expiry to `WarmupError::Timeout`.
async fn with_timeout<T, F>(timeout: Option<Duration>, id: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| WarmupError::Timeout {
                id: id.to_string(),
                after,
            })?,
        None => fut.await,
    }
}
