use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use anyhow::Result;
use shared::protocol::UDP_RECV_BUFFER;
use crate::registry::FixtureRegistry;

/// Answer each datagram (a raw service name) with one JSON datagram.
pub async fn run_udp(
    socket: UdpSocket,
    registry: Arc<FixtureRegistry>,
    cancel: CancellationToken,
) -> Result<()> {
    tracing::info!("UDP responder listening on {}", socket.local_addr()?);
    let mut buf = [0u8; UDP_RECV_BUFFER];

    loop {
        tokio::select! {
            received = socket.recv_from(&mut buf) => {
                let (len, peer) = match received {
                    Ok(r) => r,
                    Err(e) => {
                        // ICMP errors from earlier replies surface here on some platforms
                        tracing::warn!("UDP receive error: {}", e);
                        continue;
                    }
                };

                let service_name = String::from_utf8_lossy(&buf[..len]).trim().to_string();
                let reply = registry.reply_for_name(&service_name);
                tracing::debug!("UDP query for {} from {}", service_name, peer);

                if let Err(e) = socket.send_to(reply.as_bytes(), peer).await {
                    tracing::error!("Failed to send UDP reply to {}: {}", peer, e);
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("UDP responder shutting down");
                break;
            }
        }
    }

    Ok(())
}
