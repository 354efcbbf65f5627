//! Default values shared by the configuration types.

/// Prefix of API definition cache keys; the provider id is appended.
pub const API_DEFINITION_KEY_PREFIX: &str = "api_definition:";

/// API definitions are kept until invalidated.
pub const API_DEFINITION_TTL_SECS: Option<u64> = None;

/// Capacity of the in-memory cache store.
pub const MEMORY_CACHE_CAPACITY: usize = 256;
