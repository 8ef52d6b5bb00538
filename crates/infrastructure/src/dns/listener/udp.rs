use crate::dns::worker_pool::{JobQueue, QueryJob, ReplyTo};
use scriptdns_domain::Transport;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Largest datagram we read; anything longer is cut by the kernel and then
/// fails to parse.
const RECV_BUFFER_SIZE: usize = 4096;

const MIN_ERROR_BACKOFF: Duration = Duration::from_millis(10);
const MAX_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Pause after consecutive receive errors: doubles from 10ms up to 1s and
/// starts over once a datagram arrives.
#[derive(Debug, Default)]
struct ErrorBackoff {
    current: Option<Duration>,
}

impl ErrorBackoff {
    fn next_delay(&mut self) -> Duration {
        let delay = match self.current {
            None => MIN_ERROR_BACKOFF,
            Some(previous) => (previous * 2).min(MAX_ERROR_BACKOFF),
        };
        self.current = Some(delay);
        delay
    }

    fn reset(&mut self) {
        self.current = None;
    }
}

pub async fn serve(socket: Arc<UdpSocket>, queue: JobQueue, shutdown: CancellationToken) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    let mut backoff = ErrorBackoff::default();

    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buf) => received,
        };

        let (len, client) = match received {
            Ok(received) => {
                backoff.reset();
                received
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
            Err(e) => {
                let delay = backoff.next_delay();
                error!(error = %e, retry_in = ?delay, "UDP recv error");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(delay) => continue,
                }
            }
        };

        let job = QueryJob {
            payload: buf[..len].to_vec(),
            client,
            transport: Transport::Udp,
            reply: ReplyTo::Udp(Arc::clone(&socket)),
        };
        if queue.try_submit(job).is_err() {
            debug!(client = %client, "Query queue full, dropping datagram");
        }
    }

    debug!("UDP listener stopped");
}
