use std::collections::HashMap;
use std::fmt;
use parking_lot::RwLock;
use shared::protocol::DEFAULT_NAMESPACE;
use shared::types::{DiscoverQuery, ServiceNode};

/// Composite cache key `serviceName:namespace:version:proxy`.
///
/// An absent namespace renders as `default`, an absent version or proxy flag
/// as the empty string. Explicit `Some("default")`, `Some("")` and
/// `Some(false)` therefore do not all collide with the absent form: the
/// proxy flag renders as `false` rather than empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(
        service_name: &str,
        namespace: Option<&str>,
        version: Option<&str>,
        proxy: Option<bool>,
    ) -> Self {
        let proxy = proxy.map(|p| p.to_string()).unwrap_or_default();
        Self(format!(
            "{}:{}:{}:{}",
            service_name,
            namespace.unwrap_or(DEFAULT_NAMESPACE),
            version.unwrap_or(""),
            proxy,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&DiscoverQuery> for CacheKey {
    fn from(query: &DiscoverQuery) -> Self {
        CacheKey::new(
            &query.service_name,
            query.namespace.as_deref(),
            query.version.as_deref(),
            query.proxy,
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insert-only map of resolved nodes. Entries live as long as the cache.
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: RwLock<HashMap<CacheKey, ServiceNode>>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<ServiceNode> {
        self.entries.read().get(key).cloned()
    }

    /// Store `node` under `key` unless the key is already populated, and
    /// return the resident node. A populated key is never overwritten.
    pub fn insert(&self, key: CacheKey, node: ServiceNode) -> ServiceNode {
        self.entries.write().entry(key).or_insert(node).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
