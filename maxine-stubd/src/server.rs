use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use crate::api::routes::{self, AppState};
use crate::config::Config;
use crate::listeners::{tcp, udp};
use crate::registry::FixtureRegistry;

/// Listeners bound by [`start`] and the tasks serving them
pub struct RunningRegistry {
    pub http_addr: SocketAddr,
    pub udp_addr: Option<SocketAddr>,
    pub tcp_addr: Option<SocketAddr>,
    pub registry: Arc<FixtureRegistry>,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningRegistry {
    /// Wait for every serving task to finish. Tasks exit once the
    /// cancellation token passed to [`start`] fires.
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!("Registry task panicked: {}", e);
            }
        }
    }
}

/// Bind every enabled listener and spawn its serving task.
pub async fn start(config: Config, cancel: CancellationToken) -> Result<RunningRegistry> {
    let registry = Arc::new(FixtureRegistry::new(config.services));
    let mut tasks = Vec::new();

    let listener = TcpListener::bind(&config.http.listen)
        .await
        .with_context(|| format!("Failed to bind HTTP to {}", config.http.listen))?;
    let http_addr = listener.local_addr()?;
    tracing::info!("API listening on {}", http_addr);

    let app = routes::router(AppState {
        registry: registry.clone(),
    });
    let server_cancel = cancel.clone();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    }));

    let udp_addr = if config.udp.enabled {
        let socket = UdpSocket::bind(&config.udp.listen)
            .await
            .with_context(|| format!("Failed to bind UDP to {}", config.udp.listen))?;
        let addr = socket.local_addr()?;
        let udp_registry = registry.clone();
        let udp_cancel = cancel.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = udp::run_udp(socket, udp_registry, udp_cancel).await {
                tracing::error!("UDP responder error: {}", e);
            }
        }));
        Some(addr)
    } else {
        None
    };

    let tcp_addr = if config.tcp.enabled {
        let listener = TcpListener::bind(&config.tcp.listen)
            .await
            .with_context(|| format!("Failed to bind TCP to {}", config.tcp.listen))?;
        let addr = listener.local_addr()?;
        let tcp_registry = registry.clone();
        let tcp_cancel = cancel.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = tcp::run_tcp(listener, tcp_registry, tcp_cancel).await {
                tracing::error!("TCP responder error: {}", e);
            }
        }));
        Some(addr)
    } else {
        None
    };

    Ok(RunningRegistry {
        http_addr,
        udp_addr,
        tcp_addr,
        registry,
        tasks,
    })
}
