use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use shared::protocol::SOCKET_TIMEOUT;
use shared::types::ServiceNode;
use crate::error::DiscoveryError;

/// Write `service_name` plus a newline on a new connection and parse the
/// first line of the response. The stream is dropped on every return path.
pub fn exchange(service_name: &str, host: &str, port: u16) -> Result<ServiceNode, DiscoveryError> {
    let stream = connect(host, port)?;
    stream.set_read_timeout(Some(SOCKET_TIMEOUT))?;

    let mut writer = &stream;
    writer.write_all(format!("{}\n", service_name).as_bytes())?;
    writer.flush()?;

    let mut line = String::new();
    let read = BufReader::new(&stream).read_line(&mut line)?;
    if read == 0 {
        return Err(DiscoveryError::EmptyResponse);
    }
    tracing::debug!("TCP reply of {} bytes from {}:{}", read, host, port);

    Ok(ServiceNode::from_json(line.trim_end().as_bytes())?)
}

fn connect(host: &str, port: u16) -> Result<TcpStream, DiscoveryError> {
    let mut last_err = None;
    for addr in super::resolve(host, port)? {
        match TcpStream::connect_timeout(&addr, SOCKET_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(match last_err {
        Some(e) => DiscoveryError::Io(e),
        None => DiscoveryError::NoAddress(format!("{}:{}", host, port)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    /// Accepts one connection, reads the request line, writes `reply` and
    /// then waits for the client to hang up. Returns the request line and
    /// whether EOF was observed.
    fn responder(reply: &'static [u8]) -> (u16, thread::JoinHandle<(String, bool)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            stream.set_read_timeout(Some(SOCKET_TIMEOUT * 5)).unwrap();
            let mut reader = BufReader::new(&stream);
            let mut request = String::new();
            reader.read_line(&mut request).unwrap();
            (&stream).write_all(reply).unwrap();

            let mut rest = Vec::new();
            let closed = matches!(reader.read_to_end(&mut rest), Ok(0));
            (request, closed)
        });
        (port, handle)
    }

    #[test]
    fn test_line_exchange() {
        let (port, handle) = responder(b"{\"address\":\"10.0.0.1:9000\",\"nodeName\":\"n1\"}\n");

        let node = exchange("orders", "127.0.0.1", port).unwrap();
        assert_eq!(node, ServiceNode::new("10.0.0.1:9000", "n1"));

        let (request, closed) = handle.join().unwrap();
        assert_eq!(request, "orders\n");
        assert!(closed, "client should close the connection");
    }

    #[test]
    fn test_reads_only_first_line() {
        let (port, handle) = responder(
            b"{\"address\":\"10.0.0.1:9000\",\"nodeName\":\"n1\"}\n{\"address\":\"x\",\"nodeName\":\"y\"}\n",
        );

        let node = exchange("orders", "127.0.0.1", port).unwrap();
        assert_eq!(node.node_name, "n1");
        handle.join().unwrap();
    }

    #[test]
    fn test_malformed_line_still_closes() {
        let (port, handle) = responder(b"{\"address\":\n");

        let err = exchange("orders", "127.0.0.1", port).unwrap_err();
        assert!(matches!(err, DiscoveryError::Malformed(_)));

        let (_, closed) = handle.join().unwrap();
        assert!(closed, "client should close the connection on parse failure");
    }

    #[test]
    fn test_empty_response() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf);
        });

        let err = exchange("orders", "127.0.0.1", port).unwrap_err();
        assert!(matches!(err, DiscoveryError::EmptyResponse));
        handle.join().unwrap();
    }

    #[test]
    fn test_connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = exchange("orders", "127.0.0.1", port).unwrap_err();
        assert!(matches!(err, DiscoveryError::Io(_)));
    }
}
