// warmcache: speculative warm-up of entity trees into a single-use cache.
// Resolve dependencies, fetch concurrently, publish once, claim once.

pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod resolver;
pub mod store;
pub mod warmup;

pub use cache::{SingleUseCache, cache_key};
pub use config::WarmupConfig;
pub use entity::{DependencyEntity, EntityId, Field, ModuleRef, Page, RootEntity, WarmupResult};
pub use error::{Result, WarmupError};
pub use resolver::{DependencyResolver, DependencySet, GroupKeyPrecedence, KeyAccessor};
pub use store::{EntityStore, FsEntityStore, NoopPreloader, Preloader};
pub use warmup::{WarmupOrchestrator, WarmupStats};
