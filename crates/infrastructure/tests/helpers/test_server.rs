#![allow(dead_code)]

use super::scripts::{build_handler_with_timeout, TestZone};
use scriptdns_infrastructure::dns::{DnsServer, ServerOptions};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(3);

/// A real server on an ephemeral loopback port.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start(zones: Vec<TestZone>, budget: Duration) -> Self {
        Self::start_with(zones, budget, Duration::from_secs(2), Duration::from_secs(2)).await
    }

    pub async fn start_with(
        zones: Vec<TestZone>,
        budget: Duration,
        query_timeout: Duration,
        drain_timeout: Duration,
    ) -> Self {
        let handler = build_handler_with_timeout(zones, budget, query_timeout).await;
        let options = ServerOptions {
            workers: 4,
            queue_depth: 64,
            drain_timeout,
            tcp_idle_timeout: Duration::from_secs(2),
        };
        let server = DnsServer::bind("127.0.0.1:0".parse().unwrap(), handler, options).unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(server.run(shutdown.clone()));

        Self {
            addr,
            shutdown,
            task: Some(task),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn query_udp(&self, query: &[u8]) -> Vec<u8> {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.send_to(query, self.addr).await.unwrap();
        let mut buf = vec![0u8; 4096];
        let (len, _) = tokio::time::timeout(CLIENT_TIMEOUT, socket.recv_from(&mut buf))
            .await
            .expect("UDP response timed out")
            .unwrap();
        buf.truncate(len);
        buf
    }

    pub async fn connect_tcp(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }

    pub async fn query_tcp(&self, query: &[u8]) -> Vec<u8> {
        let mut stream = self.connect_tcp().await;
        tcp_exchange(&mut stream, query).await
    }

    /// Cancels the server and waits for it to finish draining.
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            tokio::time::timeout(Duration::from_secs(5), task)
                .await
                .expect("server did not stop in time")
                .unwrap();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

pub async fn tcp_exchange(stream: &mut TcpStream, query: &[u8]) -> Vec<u8> {
    let mut frame = (query.len() as u16).to_be_bytes().to_vec();
    frame.extend_from_slice(query);
    stream.write_all(&frame).await.unwrap();

    let mut len_buf = [0u8; 2];
    tokio::time::timeout(CLIENT_TIMEOUT, stream.read_exact(&mut len_buf))
        .await
        .expect("TCP response timed out")
        .unwrap();
    let mut response = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    stream.read_exact(&mut response).await.unwrap();
    response
}
