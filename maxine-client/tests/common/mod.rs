#![allow(dead_code)]

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use maxine_stubd::{Config, RunningRegistry};

pub const SERVICES: &str = r#"
[[services]]
service_name = "orders"
address = "10.0.0.1:9000"
node_name = "n1"

[[services]]
service_name = "orders"
version = "2.0"
address = "10.0.0.2:9000"
node_name = "n2"

[[services]]
service_name = "orders"
namespace = "staging"
address = "10.0.1.1:9000"
node_name = "staging-1"

[[services]]
service_name = "billing"
address = "10.0.0.9:7000"
node_name = "billing-1"
"#;

/// Fixture registry on ephemeral loopback ports, served from its own runtime
/// so tests can call the blocking client directly.
pub struct StubRegistry {
    runtime: Runtime,
    cancel: CancellationToken,
    running: Option<RunningRegistry>,
}

impl StubRegistry {
    pub fn start() -> Self {
        let config = Config::parse(&format!(
            "[http]\nlisten = \"127.0.0.1:0\"\n[udp]\nlisten = \"127.0.0.1:0\"\n[tcp]\nlisten = \"127.0.0.1:0\"\n{}",
            SERVICES
        ))
        .unwrap();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let cancel = CancellationToken::new();
        let running = runtime
            .block_on(maxine_stubd::start(config, cancel.clone()))
            .unwrap();

        Self {
            runtime,
            cancel,
            running: Some(running),
        }
    }

    fn running(&self) -> &RunningRegistry {
        self.running.as_ref().unwrap()
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.running().http_addr)
    }

    pub fn udp_port(&self) -> u16 {
        self.running().udp_addr.unwrap().port()
    }

    pub fn tcp_port(&self) -> u16 {
        self.running().tcp_addr.unwrap().port()
    }

    /// Discover lookups the registry has answered, hit or miss
    pub fn discover_requests(&self) -> u64 {
        self.running().registry.metrics().discover_requests
    }
}

impl Drop for StubRegistry {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(running) = self.running.take() {
            self.runtime.block_on(running.join());
        }
    }
}
