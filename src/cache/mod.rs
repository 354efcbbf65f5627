//! Metadata caching
//!
//! `MetadataCache` serves the two non-invocation queries (API definition and
//! configured models). `memory` provides in-process implementations of the
//! cache and override store collaborators.

mod memory;
mod metadata;

pub use memory::{MemoryCacheStore, MemoryOverrideStore};
pub use metadata::MetadataCache;
pub(crate) use metadata::ttl_from_secs;
