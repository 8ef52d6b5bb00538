use super::server::DnsServerHandler;
use scriptdns_domain::Transport;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Where a worker sends the bytes it produced.
pub enum ReplyTo {
    Udp(Arc<UdpSocket>),
    /// The connection task writes the frame; `None` closes the connection.
    Tcp(oneshot::Sender<Option<Vec<u8>>>),
}

pub struct QueryJob {
    pub payload: Vec<u8>,
    pub client: SocketAddr,
    pub transport: Transport,
    pub reply: ReplyTo,
}

/// Producer side of the bounded job queue, cloned into every listener.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<QueryJob>,
}

impl JobQueue {
    /// Enqueues without waiting; the job is handed back when the queue is full.
    pub fn try_submit(&self, job: QueryJob) -> Result<(), QueryJob> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(job) | mpsc::error::TrySendError::Closed(job) => job,
        })
    }

    /// Waits for room in the queue. Fails only once the pool is gone.
    pub async fn submit(&self, job: QueryJob) -> Result<(), QueryJob> {
        self.sender.send(job).await.map_err(|e| e.0)
    }
}

/// A fixed number of tasks pulling queries from one bounded queue.
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    pub fn start(handler: Arc<DnsServerHandler>, workers: usize, queue_depth: usize) -> (Self, JobQueue) {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let mut set = JoinSet::new();

        for worker_id in 0..workers.max(1) {
            let receiver = Arc::clone(&receiver);
            let handler = Arc::clone(&handler);
            set.spawn(async move {
                run_worker(worker_id, receiver, handler).await;
            });
        }

        info!(workers, queue_depth, "Worker pool started");
        (Self { workers: set }, JobQueue { sender })
    }

    /// Waits for the workers to empty the queue and exit, which happens once
    /// every `JobQueue` clone has been dropped. Workers still busy at the
    /// deadline are aborted.
    pub async fn drain(mut self, deadline: Instant) {
        let drained = tokio::time::timeout_at(deadline, async {
            while self.workers.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(remaining = self.workers.len(), "Drain deadline reached, aborting workers");
            self.workers.abort_all();
            while self.workers.join_next().await.is_some() {}
        } else {
            info!("Worker pool drained");
        }
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<QueryJob>>>,
    handler: Arc<DnsServerHandler>,
) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(job) = job else {
            break;
        };

        let response = handler
            .handle_raw(&job.payload, job.client, job.transport)
            .await;

        match job.reply {
            ReplyTo::Udp(socket) => {
                if let Some(bytes) = response {
                    if let Err(e) = socket.send_to(&bytes, job.client).await {
                        debug!(worker = worker_id, client = %job.client, error = %e, "UDP send failed");
                    }
                }
            }
            ReplyTo::Tcp(reply) => {
                let _ = reply.send(response);
            }
        }
    }

    debug!(worker = worker_id, "Worker stopped");
}
