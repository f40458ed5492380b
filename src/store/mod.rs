// Entity store and module preloader boundaries.
// The orchestrator only talks to these traits; `FsEntityStore` is the bundled local store.

pub mod fs;

use async_trait::async_trait;

use crate::entity::{DependencyEntity, ModuleRef, RootEntity};
use crate::error::Result;

pub use fs::FsEntityStore;

/// Local data store holding root and dependency entities.
///
/// `Ok(None)` means not found. The warm-up treats errors and not-found alike.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch a root entity tree by id.
    async fn fetch_root(&self, id: &str) -> Result<Option<RootEntity>>;

    /// Fetch a dependency entity by id.
    async fn fetch_dependency(&self, id: &str) -> Result<Option<DependencyEntity>>;

    /// Cheap call that wakes the store up before the real fetches.
    async fn probe(&self) -> Result<()>;
}

/// Loads consumer code ahead of time. Purely an optimization.
#[async_trait]
pub trait Preloader: Send + Sync {
    async fn preload(&self, module: &ModuleRef) -> Result<()>;
}

/// Preloader for hosts with nothing to load.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPreloader;

#[async_trait]
impl Preloader for NoopPreloader {
    async fn preload(&self, _module: &ModuleRef) -> Result<()> {
        Ok(())
    }
}
