use std::time::Duration;

/// API path prefix for every registry service operation
pub const API_PREFIX: &str = "/api/maxine/serviceops";

/// Service operation paths, relative to the registry base URL
pub const DISCOVER_PATH: &str = "/api/maxine/serviceops/discover";
pub const SERVERS_PATH: &str = "/api/maxine/serviceops/servers";
pub const HEALTH_PATH: &str = "/api/maxine/serviceops/health";
pub const METRICS_PATH: &str = "/api/maxine/serviceops/metrics";
pub const CACHE_STATS_PATH: &str = "/api/maxine/serviceops/cache/stats";
pub const CHANGES_PATH: &str = "/api/maxine/serviceops/changes";

/// Namespace assumed by the registry when a query names none
pub const DEFAULT_NAMESPACE: &str = "default";

/// Read timeout for the UDP and TCP discovery channels
pub const SOCKET_TIMEOUT: Duration = Duration::from_millis(1000);

/// Size of the UDP receive buffer. Longer replies are truncated.
pub const UDP_RECV_BUFFER: usize = 1024;
