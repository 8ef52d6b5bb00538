mod socket;
mod tcp;
mod udp;

use super::server::DnsServerHandler;
use super::worker_pool::WorkerPool;
use scriptdns_domain::config::ServerConfig;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    pub workers: usize,
    pub queue_depth: usize,
    pub drain_timeout: Duration,
    pub tcp_idle_timeout: Duration,
}

impl From<&ServerConfig> for ServerOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            workers: config.workers,
            queue_depth: config.queue_depth,
            drain_timeout: config.drain_timeout(),
            tcp_idle_timeout: config.tcp_idle_timeout(),
        }
    }
}

/// UDP and TCP listeners on one address, feeding a shared worker pool.
pub struct DnsServer {
    udp: Arc<UdpSocket>,
    tcp: TcpListener,
    handler: Arc<DnsServerHandler>,
    options: ServerOptions,
}

impl DnsServer {
    /// Binds both sockets. With port 0 the TCP listener takes the port the
    /// kernel picked for UDP.
    pub fn bind(addr: SocketAddr, handler: DnsServerHandler, options: ServerOptions) -> io::Result<Self> {
        let udp = socket::create_udp_socket(addr)?;
        let tcp = socket::create_tcp_listener(udp.local_addr()?)?;

        Ok(Self {
            udp: Arc::new(udp),
            tcp,
            handler: Arc::new(handler),
            options,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.udp.local_addr()
    }

    /// Serves until `shutdown` is cancelled, then drains.
    ///
    /// Listeners stop first. Open TCP connections finish their current frame
    /// and queued queries are answered, both against one drain deadline
    /// taken when `shutdown` fires. The sockets are released when this
    /// returns.
    pub async fn run(self, shutdown: CancellationToken) {
        let local_addr = self.udp.local_addr().ok();
        let ServerOptions {
            workers,
            queue_depth,
            drain_timeout,
            tcp_idle_timeout,
        } = self.options;

        let (pool, queue) = WorkerPool::start(Arc::clone(&self.handler), workers, queue_depth);

        let udp_task = tokio::spawn(udp::serve(
            Arc::clone(&self.udp),
            queue.clone(),
            shutdown.clone(),
        ));
        let tcp_task = tokio::spawn(tcp::serve(
            self.tcp,
            queue,
            shutdown.clone(),
            tcp_idle_timeout,
        ));

        info!(address = ?local_addr, workers, "DNS server ready (UDP and TCP)");

        shutdown.cancelled().await;
        let deadline = Instant::now() + drain_timeout;

        let _ = udp_task.await;
        let connections = tcp_task.await.unwrap_or_default();
        info!(?drain_timeout, "Listeners stopped, draining queued queries");

        tcp::drain(connections, deadline).await;
        pool.drain(deadline).await;
        info!("DNS server stopped");
    }
}
