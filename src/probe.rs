use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;

/// One connect attempt against a single address.
///
/// Implementations must absorb every network failure into `false`; a probe
/// never errors.
#[async_trait]
pub trait PortProbe: Send + Sync + 'static {
    async fn probe(&self, addr: SocketAddr, timeout: Duration) -> bool;
}

/// Full TCP handshake bounded by `tokio::time::timeout`.
///
/// The timeout covers the whole connect, so a peer that never answers and a
/// local socket stuck waiting for write readiness are both cut off. The
/// stream is dropped before returning, closing the socket on every path.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProbe;

#[async_trait]
impl PortProbe for TcpConnectProbe {
    async fn probe(&self, addr: SocketAddr, timeout: Duration) -> bool {
        match time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                true
            }
            Ok(Err(e)) => {
                // Refused, unreachable, or the platform ran out of sockets.
                log::trace!("{addr} closed: {e}");
                false
            }
            Err(_) => {
                log::trace!("{addr} timed out after {}ms", timeout.as_millis());
                false
            }
        }
    }
}
