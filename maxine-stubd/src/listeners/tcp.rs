use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use anyhow::Result;
use crate::registry::FixtureRegistry;

/// Accept connections and answer one request line on each.
pub async fn run_tcp(
    listener: TcpListener,
    registry: Arc<FixtureRegistry>,
    cancel: CancellationToken,
) -> Result<()> {
    tracing::info!("TCP responder listening on {}", listener.local_addr()?);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let registry = registry.clone();
                        tokio::spawn(async move {
                            if let Err(e) = answer(stream, &registry).await {
                                tracing::warn!("TCP exchange with {} failed: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!("TCP accept error: {}", e);
                    }
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("TCP responder shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn answer(stream: TcpStream, registry: &FixtureRegistry) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut line = String::new();
    if BufReader::new(read_half).read_line(&mut line).await? == 0 {
        return Ok(());
    }

    let service_name = line.trim();
    tracing::debug!("TCP query for {}", service_name);

    let mut reply = registry.reply_for_name(service_name);
    reply.push('\n');
    write_half.write_all(reply.as_bytes()).await?;
    write_half.shutdown().await?;
    Ok(())
}
