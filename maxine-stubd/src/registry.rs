use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use chrono::Utc;
use serde::Serialize;
use shared::protocol::DEFAULT_NAMESPACE;
use shared::types::{DiscoverQuery, ServiceNode};
use crate::config::ServiceConfig;

/// Static service table answering discovery queries.
///
/// Entries never change after startup, so a query always resolves to the
/// same node.
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    services: Vec<ServiceConfig>,
    /// Milliseconds since the epoch at which the table was loaded
    loaded_at: i64,
    discover_hits: AtomicU64,
    discover_misses: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryMetrics {
    pub discover_requests: u64,
    pub discover_hits: u64,
    pub discover_misses: u64,
    pub registered_nodes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// One registry change. The fixture table only ever produces the
/// registrations made when it was loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryChange {
    #[serde(rename = "type")]
    pub kind: String,
    pub service_name: String,
    pub node_name: String,
    pub address: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeLog {
    pub timestamp: i64,
    pub changes: Vec<RegistryChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHealth {
    pub address: String,
    pub healthy: bool,
}

impl FixtureRegistry {
    pub fn new(services: Vec<ServiceConfig>) -> Self {
        Self {
            services,
            loaded_at: Utc::now().timestamp_millis(),
            ..Default::default()
        }
    }

    /// First entry matching name and namespace. An absent or empty version
    /// matches any entry, anything else must match exactly.
    pub fn lookup(&self, query: &DiscoverQuery) -> Option<ServiceNode> {
        let namespace = query.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
        let version = query.version.as_deref().filter(|v| !v.is_empty());
        let found = self
            .services
            .iter()
            .find(|s| {
                s.service_name == query.service_name
                    && s.namespace == namespace
                    && version.map_or(true, |v| s.version.as_deref() == Some(v))
            })
            .map(|s| ServiceNode::new(s.address.clone(), s.node_name.clone()));

        let counter = if found.is_some() { &self.discover_hits } else { &self.discover_misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Reply payload for the socket channels, which only carry a service name
    pub fn reply_for_name(&self, service_name: &str) -> String {
        match self.lookup(&DiscoverQuery::new(service_name)) {
            Some(node) => serde_json::to_string(&node)
                .unwrap_or_else(|_| not_found_body()),
            None => not_found_body(),
        }
    }

    /// Service name to nodes, across all namespaces
    pub fn services(&self) -> BTreeMap<String, Vec<ServiceNode>> {
        let mut map: BTreeMap<String, Vec<ServiceNode>> = BTreeMap::new();
        for s in &self.services {
            map.entry(s.service_name.clone())
                .or_default()
                .push(ServiceNode::new(s.address.clone(), s.node_name.clone()));
        }
        map
    }

    /// Node name to health for one service. Fixture nodes are always healthy.
    pub fn health(&self, service_name: &str, namespace: &str) -> Option<BTreeMap<String, NodeHealth>> {
        let nodes: BTreeMap<String, NodeHealth> = self
            .services
            .iter()
            .filter(|s| s.service_name == service_name && s.namespace == namespace)
            .map(|s| {
                (
                    s.node_name.clone(),
                    NodeHealth {
                        address: s.address.clone(),
                        healthy: true,
                    },
                )
            })
            .collect();

        (!nodes.is_empty()).then_some(nodes)
    }

    pub fn metrics(&self) -> RegistryMetrics {
        let hits = self.discover_hits.load(Ordering::Relaxed);
        let misses = self.discover_misses.load(Ordering::Relaxed);
        RegistryMetrics {
            discover_requests: hits + misses,
            discover_hits: hits,
            discover_misses: misses,
            registered_nodes: self.services.len(),
        }
    }

    /// Lookup counters, with the static table standing in for the cache
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entries: self.services.len(),
            hits: self.discover_hits.load(Ordering::Relaxed),
            misses: self.discover_misses.load(Ordering::Relaxed),
        }
    }

    /// Changes strictly after `since`, in milliseconds since the epoch
    pub fn changes_since(&self, since: i64) -> ChangeLog {
        let changes = if since < self.loaded_at {
            self.services
                .iter()
                .map(|s| RegistryChange {
                    kind: "register".to_string(),
                    service_name: s.service_name.clone(),
                    node_name: s.node_name.clone(),
                    address: s.address.clone(),
                    timestamp: self.loaded_at,
                })
                .collect()
        } else {
            Vec::new()
        };

        ChangeLog {
            timestamp: Utc::now().timestamp_millis(),
            changes,
        }
    }
}

fn not_found_body() -> String {
    r#"{"error":"service not found"}"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, namespace: &str, version: Option<&str>, node: &str) -> ServiceConfig {
        ServiceConfig {
            service_name: name.to_string(),
            namespace: namespace.to_string(),
            version: version.map(str::to_string),
            address: format!("{}.local:9000", node),
            node_name: node.to_string(),
        }
    }

    fn registry() -> FixtureRegistry {
        FixtureRegistry::new(vec![
            entry("orders", "default", Some("1.0"), "orders-1"),
            entry("orders", "default", Some("2.0"), "orders-2"),
            entry("orders", "staging", None, "orders-staging"),
            entry("billing", "default", None, "billing-1"),
        ])
    }

    #[test]
    fn test_lookup_defaults_namespace() {
        let node = registry().lookup(&DiscoverQuery::new("orders")).unwrap();
        assert_eq!(node.node_name, "orders-1");
    }

    #[test]
    fn test_lookup_matches_version_and_namespace() {
        let registry = registry();

        let mut query = DiscoverQuery::new("orders");
        query.version = Some("2.0".to_string());
        assert_eq!(registry.lookup(&query).unwrap().node_name, "orders-2");

        let mut query = DiscoverQuery::new("orders");
        query.namespace = Some("staging".to_string());
        assert_eq!(registry.lookup(&query).unwrap().node_name, "orders-staging");

        let mut query = DiscoverQuery::new("orders");
        query.version = Some("3.0".to_string());
        assert!(registry.lookup(&query).is_none());

        let mut query = DiscoverQuery::new("orders");
        query.version = Some(String::new());
        assert_eq!(registry.lookup(&query).unwrap().node_name, "orders-1");
    }

    #[test]
    fn test_metrics_count_lookups() {
        let registry = registry();
        registry.lookup(&DiscoverQuery::new("orders"));
        registry.lookup(&DiscoverQuery::new("missing"));
        registry.lookup(&DiscoverQuery::new("billing"));

        let metrics = registry.metrics();
        assert_eq!(metrics.discover_requests, 3);
        assert_eq!(metrics.discover_hits, 2);
        assert_eq!(metrics.discover_misses, 1);
        assert_eq!(metrics.registered_nodes, 4);
    }

    #[test]
    fn test_reply_for_name() {
        let registry = registry();
        let reply = registry.reply_for_name("billing");
        assert_eq!(reply, r#"{"address":"billing-1.local:9000","nodeName":"billing-1"}"#);
        assert_eq!(registry.reply_for_name("missing"), r#"{"error":"service not found"}"#);
    }

    #[test]
    fn test_cache_stats() {
        let registry = registry();
        registry.lookup(&DiscoverQuery::new("orders"));
        registry.lookup(&DiscoverQuery::new("missing"));

        let stats = registry.cache_stats();
        assert_eq!(stats, CacheStats { entries: 4, hits: 1, misses: 1 });
    }

    #[test]
    fn test_changes_since_load() {
        let registry = registry();

        let log = registry.changes_since(0);
        assert_eq!(log.changes.len(), 4);
        assert!(log.changes.iter().all(|c| c.kind == "register"));
        assert_eq!(log.changes[3].node_name, "billing-1");

        let later = registry.changes_since(log.changes[0].timestamp);
        assert!(later.changes.is_empty());
    }

    #[test]
    fn test_services_and_health() {
        let registry = registry();
        let services = registry.services();
        assert_eq!(services["orders"].len(), 3);
        assert_eq!(services["billing"].len(), 1);

        let health = registry.health("orders", "default").unwrap();
        assert_eq!(health.len(), 2);
        assert!(health["orders-1"].healthy);
        assert!(registry.health("orders", "prod").is_none());
    }
}
