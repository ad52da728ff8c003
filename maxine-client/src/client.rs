use std::collections::HashMap;
use parking_lot::Mutex;
use serde_json::Value;
use shared::protocol::{
    CACHE_STATS_PATH, CHANGES_PATH, DEFAULT_NAMESPACE, DISCOVER_PATH, HEALTH_PATH, METRICS_PATH,
    SERVERS_PATH,
};
use shared::types::{DiscoverQuery, ServiceNode};
use crate::cache::{CacheKey, NodeCache};
use crate::config::ClientConfig;
use crate::error::DiscoveryError;
use crate::transport::{tcp, udp};

/// Discovery client for a Maxine registry.
///
/// HTTP lookups are cached for the lifetime of the client; UDP and TCP
/// lookups always go to the network. The public lookups never fail loudly:
/// every error is logged and turned into `None` (or `false`). The `try_*`
/// variants return the underlying [`DiscoveryError`] instead.
pub struct DiscoveryClient {
    registry_url: String,
    agent: Mutex<Option<ureq::Agent>>,
    cache: NodeCache,
}

impl DiscoveryClient {
    pub fn new(registry_url: &str) -> Self {
        Self::with_config(&ClientConfig::new(registry_url))
    }

    pub fn with_config(config: &ClientConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Self {
            registry_url: config.base_url().to_string(),
            agent: Mutex::new(Some(builder.build())),
            cache: NodeCache::new(),
        }
    }

    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Resolve a service over HTTP, serving repeated queries from the cache.
    pub fn discover(
        &self,
        service_name: &str,
        namespace: Option<&str>,
        version: Option<&str>,
        proxy: Option<bool>,
    ) -> Option<ServiceNode> {
        let query = DiscoverQuery {
            service_name: service_name.to_string(),
            namespace: namespace.map(str::to_string),
            version: version.map(str::to_string),
            proxy,
        };
        degrade(self.try_discover(&query), "discover", service_name)
    }

    pub fn try_discover(&self, query: &DiscoverQuery) -> Result<ServiceNode, DiscoveryError> {
        let key = CacheKey::from(query);
        if let Some(node) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(node);
        }

        let mut request = self.agent()?
            .get(&self.url(DISCOVER_PATH))
            .query("serviceName", &query.service_name);
        if let Some(namespace) = &query.namespace {
            request = request.query("namespace", namespace);
        }
        if let Some(version) = &query.version {
            request = request.query("version", version);
        }
        if let Some(proxy) = query.proxy {
            request = request.query("proxy", if proxy { "true" } else { "false" });
        }

        let body = read_ok_body(request.call()?)?;
        let node = ServiceNode::from_json(body.as_bytes())?;
        Ok(self.cache.insert(key, node))
    }

    /// Resolve a service with a single UDP datagram. Never cached.
    pub fn discover_udp(&self, service_name: &str, udp_port: u16, udp_host: &str) -> Option<ServiceNode> {
        degrade(self.try_discover_udp(service_name, udp_port, udp_host), "UDP discover", service_name)
    }

    pub fn try_discover_udp(
        &self,
        service_name: &str,
        udp_port: u16,
        udp_host: &str,
    ) -> Result<ServiceNode, DiscoveryError> {
        udp::exchange(service_name, udp_host, udp_port)
    }

    /// Resolve a service over a one-shot TCP connection. Never cached.
    pub fn discover_tcp(&self, service_name: &str, tcp_port: u16, tcp_host: &str) -> Option<ServiceNode> {
        degrade(self.try_discover_tcp(service_name, tcp_port, tcp_host), "TCP discover", service_name)
    }

    pub fn try_discover_tcp(
        &self,
        service_name: &str,
        tcp_port: u16,
        tcp_host: &str,
    ) -> Result<ServiceNode, DiscoveryError> {
        tcp::exchange(service_name, tcp_host, tcp_port)
    }

    /// Not supported by this client; always returns false.
    pub fn register(&self, service_name: &str, address: &str, metadata: Option<&HashMap<String, Value>>) -> bool {
        tracing::warn!(
            "Registration not implemented in discovery client (service={}, address={}, metadata keys={})",
            service_name,
            address,
            metadata.map_or(0, |m| m.len())
        );
        false
    }

    /// Not supported by this client; always returns false.
    pub fn deregister(&self, service_name: &str, node_name: &str) -> bool {
        tracing::warn!(
            "Deregistration not implemented in discovery client (service={}, node={})",
            service_name,
            node_name
        );
        false
    }

    /// All services known to the registry, as returned by the registry.
    pub fn list_services(&self) -> Option<Value> {
        degrade(self.try_list_services(), "list services", "*")
    }

    pub fn try_list_services(&self) -> Result<Value, DiscoveryError> {
        let request = self.agent()?.get(&self.url(SERVERS_PATH));
        let body = read_ok_body(request.call()?)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Health of every node of a service.
    pub fn service_health(&self, service_name: &str, namespace: Option<&str>) -> Option<Value> {
        degrade(self.try_service_health(service_name, namespace), "service health", service_name)
    }

    pub fn try_service_health(&self, service_name: &str, namespace: Option<&str>) -> Result<Value, DiscoveryError> {
        let request = self.agent()?
            .get(&self.url(HEALTH_PATH))
            .query("serviceName", service_name)
            .query("namespace", namespace.unwrap_or(DEFAULT_NAMESPACE));
        let body = read_ok_body(request.call()?)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Registry-side request metrics.
    pub fn metrics(&self) -> Option<Value> {
        degrade(self.try_metrics(), "metrics", "*")
    }

    pub fn try_metrics(&self) -> Result<Value, DiscoveryError> {
        let request = self.agent()?.get(&self.url(METRICS_PATH));
        let body = read_ok_body(request.call()?)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Registry-side discovery cache statistics.
    pub fn cache_stats(&self) -> Option<Value> {
        degrade(self.try_cache_stats(), "cache stats", "*")
    }

    pub fn try_cache_stats(&self) -> Result<Value, DiscoveryError> {
        let request = self.agent()?.get(&self.url(CACHE_STATS_PATH));
        let body = read_ok_body(request.call()?)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Registry changes after `since` (milliseconds since the Unix epoch).
    pub fn changes(&self, since: i64) -> Option<Value> {
        degrade(self.try_changes(since), "changes", "*")
    }

    pub fn try_changes(&self, since: i64) -> Result<Value, DiscoveryError> {
        let request = self.agent()?
            .get(&self.url(CHANGES_PATH))
            .query("since", &since.to_string());
        let body = read_ok_body(request.call()?)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Look up the cache only. Never touches the network.
    pub fn cached(
        &self,
        service_name: &str,
        namespace: Option<&str>,
        version: Option<&str>,
        proxy: Option<bool>,
    ) -> Option<ServiceNode> {
        self.cache.get(&CacheKey::new(service_name, namespace, version, proxy))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Release the HTTP agent and its pooled connections. Later HTTP calls
    /// fail with [`DiscoveryError::Closed`]; a second close is a no-op.
    pub fn close(&self) {
        match self.agent.lock().take() {
            Some(agent) => {
                drop(agent);
                tracing::debug!("Released HTTP agent for {}", self.registry_url);
            }
            None => tracing::debug!("Client for {} already closed", self.registry_url),
        }
    }

    fn agent(&self) -> Result<ureq::Agent, DiscoveryError> {
        self.agent.lock().clone().ok_or(DiscoveryError::Closed)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.registry_url, path)
    }
}

/// Only 200 counts as success; ureq already reports 4xx/5xx as errors.
fn read_ok_body(response: ureq::Response) -> Result<String, DiscoveryError> {
    let status = response.status();
    if status != 200 {
        return Err(DiscoveryError::NotFound { status });
    }
    Ok(response.into_string()?)
}

fn degrade<T>(result: Result<T, DiscoveryError>, operation: &str, service_name: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_not_found() => {
            tracing::warn!("Service {} failed for {}: {}", operation, service_name, e);
            None
        }
        Err(e) => {
            tracing::error!("Error during {} for {}: {}", operation, service_name, e);
            None
        }
    }
}
