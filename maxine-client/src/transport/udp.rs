use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use shared::protocol::{SOCKET_TIMEOUT, UDP_RECV_BUFFER};
use shared::types::ServiceNode;
use crate::error::DiscoveryError;

/// Send the service name as a single datagram and parse the single reply.
///
/// The reply is read into a fixed buffer of `UDP_RECV_BUFFER` bytes; anything
/// beyond that is dropped by the socket and the remainder usually fails to
/// parse.
pub fn exchange(service_name: &str, host: &str, port: u16) -> Result<ServiceNode, DiscoveryError> {
    let target = super::resolve(host, port)?[0];
    let local: SocketAddr = match target {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };

    let socket = UdpSocket::bind(local)?;
    socket.set_read_timeout(Some(SOCKET_TIMEOUT))?;
    socket.send_to(service_name.as_bytes(), target)?;

    let mut buf = [0u8; UDP_RECV_BUFFER];
    let (len, from) = socket.recv_from(&mut buf)?;
    tracing::debug!("UDP reply of {} bytes from {}", len, from);

    Ok(ServiceNode::from_json(&buf[..len])?)
}
