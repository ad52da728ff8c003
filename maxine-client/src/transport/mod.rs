//! One-shot socket channels. Each call opens a fresh socket and drops it
//! before returning, whatever the outcome.

pub mod tcp;
pub mod udp;

use std::net::{SocketAddr, ToSocketAddrs};
use crate::error::DiscoveryError;

fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, DiscoveryError> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(DiscoveryError::NoAddress(format!("{}:{}", host, port)));
    }
    Ok(addrs)
}
