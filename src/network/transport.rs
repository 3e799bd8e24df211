use crate::error::{BlockchainError, Result};
use crate::network::Message;
use log::{debug, warn};
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

const TCP_READ_TIMEOUT: u64 = 5000;

/// Outbound half of the network: deliver one message to a peer port.
pub trait Transport: Send + Sync {
    fn send(&self, port: u16, message: &Message) -> Result<()>;
}

/// Inbound half of the network: block until the next message arrives.
pub trait Inbox {
    fn receive(&mut self) -> Result<Message>;
}

/// Sends `message` to every port, logging and skipping unreachable peers.
/// Returns how many deliveries succeeded.
pub fn broadcast(transport: &dyn Transport, ports: &[u16], message: &Message) -> usize {
    ports
        .iter()
        .filter(|&&port| match transport.send(port, message) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to deliver {} to {port}: {e}", message.get_payload().kind());
                false
            }
        })
        .count()
}

/// One JSON message per short-lived TCP connection.
pub struct TcpTransport {
    host: String,
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, connect_timeout: Duration) -> TcpTransport {
        TcpTransport {
            host: host.into(),
            connect_timeout,
        }
    }

    fn resolve(&self, port: u16) -> Result<SocketAddr> {
        (self.host.as_str(), port)
            .to_socket_addrs()
            .map_err(|e| {
                BlockchainError::Network(format!("Invalid address {}:{port}: {e}", self.host))
            })?
            .next()
            .ok_or_else(|| {
                BlockchainError::Network(format!("No address for {}:{port}", self.host))
            })
    }
}

impl Transport for TcpTransport {
    fn send(&self, port: u16, message: &Message) -> Result<()> {
        let addr = self.resolve(port)?;
        debug!("Sending {} to {addr}", message.get_payload().kind());

        let mut stream = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map_err(|e| BlockchainError::Network(format!("Failed to connect to {addr}: {e}")))?;

        stream
            .set_write_timeout(Some(self.connect_timeout))
            .map_err(|e| BlockchainError::Network(format!("Failed to set write timeout: {e}")))?;

        serde_json::to_writer(&stream, message)
            .map_err(|e| BlockchainError::Network(format!("Failed to send data: {e}")))?;

        stream.flush()?;
        let _ = stream.shutdown(Shutdown::Write);
        Ok(())
    }
}

/// Listening socket; each accepted connection carries exactly one message.
pub struct TcpInbox {
    listener: TcpListener,
}

impl TcpInbox {
    pub fn bind(host: &str, port: u16) -> Result<TcpInbox> {
        let listener = TcpListener::bind((host, port)).map_err(|e| {
            BlockchainError::Network(format!("Failed to bind to {host}:{port}: {e}"))
        })?;
        Ok(TcpInbox { listener })
    }

    pub fn local_port(&self) -> Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }
}

impl Inbox for TcpInbox {
    fn receive(&mut self) -> Result<Message> {
        let (stream, peer_addr) = self
            .listener
            .accept()
            .map_err(|e| BlockchainError::Network(format!("Error accepting connection: {e}")))?;

        stream
            .set_read_timeout(Some(Duration::from_millis(TCP_READ_TIMEOUT)))
            .map_err(|e| BlockchainError::Network(format!("Failed to set read timeout: {e}")))?;

        let message = serde_json::from_reader(BufReader::new(&stream)).map_err(|e| {
            BlockchainError::Network(format!("Failed to decode message from {peer_addr}: {e}"))
        })?;
        let _ = stream.shutdown(Shutdown::Both);
        Ok(message)
    }
}
