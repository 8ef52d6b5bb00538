use crate::di::DnsServices;
use anyhow::Context;
use scriptdns_infrastructure::dns::DnsServer;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn start_dns_server(
    bind_addr: String,
    services: DnsServices,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {}", bind_addr))?;

    let num_workers = services.options.workers;
    let server = DnsServer::bind(socket_addr, services.handler, services.options)
        .with_context(|| format!("failed to bind DNS sockets on {}", socket_addr))?;

    info!(bind_address = %socket_addr, num_workers, "Starting DNS server");
    server.run(shutdown).await;
    Ok(())
}
