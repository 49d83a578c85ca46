//! Dashboard data binding
//!
//! Modules declare their data sources and how to shape them; the manager loads
//! them concurrently, caches source results and keeps per-module state.

pub mod adapter;
pub mod cache;
pub mod descriptor;
pub mod error;
pub mod manager;
pub mod module;
pub mod transform;

pub use adapter::{DataSourceAdapter, FetchOptions, SourceData};
pub use cache::SourceCache;
pub use descriptor::{
    Computation, CustomTransform, DataSourceConfig, MergeStrategy, ModuleConfigPatch,
    ModuleDescriptor, SourceKind, TransformSpec,
};
pub use error::BindingError;
pub use manager::{DataBindingManager, GlobalConfig, GlobalConfigPatch};
pub use module::{ModuleBinding, ModuleStatus};
