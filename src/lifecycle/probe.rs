use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;

/// Answers "is something listening on this local TCP port".
#[async_trait]
pub trait PortProbe: Send + Sync {
    async fn is_listening(&self, port: u16) -> io::Result<bool>;
}

/// Probes by attempting a loopback connection.
pub struct TcpConnectProbe {
    timeout: Duration,
}

impl TcpConnectProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl PortProbe for TcpConnectProbe {
    async fn is_listening(&self, port: u16) -> io::Result<bool> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => Ok(false),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connect to {addr} timed out"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn detects_open_and_closed_ports() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let probe = TcpConnectProbe::new(Duration::from_millis(500));

        assert!(probe.is_listening(port).await.unwrap());

        drop(listener);
        assert!(!probe.is_listening(port).await.unwrap());
    }
}
