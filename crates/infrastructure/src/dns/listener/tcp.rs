use crate::dns::response_encoder::TCP_MAX_MESSAGE;
use crate::dns::worker_pool::{JobQueue, QueryJob, ReplyTo};
use bytes::{Bytes, BytesMut};
use scriptdns_domain::Transport;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A DNS header is 12 bytes; shorter frames cannot be queries.
const MIN_FRAME_LEN: usize = 12;

/// RFC 1035 §4.2.2 framing: a two-byte big-endian length before each message.
fn dns_frame_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(2)
        .max_frame_length(TCP_MAX_MESSAGE)
        .new_codec()
}

/// Accepts connections until shutdown and hands back the ones still open.
pub async fn serve(
    listener: TcpListener,
    queue: JobQueue,
    shutdown: CancellationToken,
    idle_timeout: Duration,
) -> JoinSet<()> {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, client)) => {
                    connections.spawn(handle_connection(
                        stream,
                        client,
                        queue.clone(),
                        shutdown.clone(),
                        idle_timeout,
                    ));
                }
                Err(e) => warn!(error = %e, "TCP accept failed"),
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    debug!(open = connections.len(), "TCP listener stopped");
    connections
}

/// Lets open connections finish the frame they are working on, closing
/// whatever is still busy at `deadline`.
pub async fn drain(mut connections: JoinSet<()>, deadline: Instant) {
    let finished = tokio::time::timeout_at(deadline, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if finished.is_err() {
        warn!(remaining = connections.len(), "Closing TCP connections still busy at drain deadline");
        connections.abort_all();
        while connections.join_next().await.is_some() {}
    }
}

/// Serves length-prefixed queries on one connection, one at a time.
///
/// The connection is closed on EOF, idle timeout, shutdown between frames,
/// or a frame that does not parse as a query.
async fn handle_connection(
    mut stream: TcpStream,
    client: SocketAddr,
    queue: JobQueue,
    shutdown: CancellationToken,
    idle_timeout: Duration,
) {
    let _ = stream.set_nodelay(true);
    let mut codec = dns_frame_codec();
    let mut inbound = BytesMut::with_capacity(512);

    loop {
        let Some(payload) =
            read_frame(&mut stream, &mut codec, &mut inbound, client, &shutdown, idle_timeout).await
        else {
            break;
        };

        if payload.len() < MIN_FRAME_LEN {
            debug!(client = %client, len = payload.len(), "TCP frame too short, closing");
            break;
        }

        let (reply, response) = oneshot::channel();
        let job = QueryJob {
            payload: payload.to_vec(),
            client,
            transport: Transport::Tcp,
            reply: ReplyTo::Tcp(reply),
        };
        if queue.submit(job).await.is_err() {
            break;
        }

        let Ok(Some(response)) = response.await else {
            debug!(client = %client, "Malformed TCP query, closing");
            break;
        };

        let mut outbound = BytesMut::with_capacity(response.len() + 2);
        if let Err(e) = codec.encode(Bytes::from(response), &mut outbound) {
            debug!(client = %client, error = %e, "Cannot frame TCP response, closing");
            break;
        }
        if stream.write_all(&outbound).await.is_err() {
            break;
        }
    }
}

/// Reads until one whole frame is buffered. Shutdown is only honoured while
/// no part of the next frame has arrived.
async fn read_frame(
    stream: &mut TcpStream,
    codec: &mut LengthDelimitedCodec,
    inbound: &mut BytesMut,
    client: SocketAddr,
    shutdown: &CancellationToken,
    idle_timeout: Duration,
) -> Option<BytesMut> {
    let mut received = false;
    loop {
        match codec.decode(inbound) {
            Ok(Some(frame)) => return Some(frame),
            Ok(None) => {}
            Err(e) => {
                debug!(client = %client, error = %e, "Bad TCP frame, closing");
                return None;
            }
        }

        let between_frames = !received && inbound.is_empty();
        let read = tokio::select! {
            _ = shutdown.cancelled(), if between_frames => return None,
            read = tokio::time::timeout(idle_timeout, stream.read_buf(inbound)) => read,
        };
        match read {
            Ok(Ok(0)) | Ok(Err(_)) => return None,
            Ok(Ok(_)) => received = true,
            Err(_) => {
                debug!(client = %client, "TCP connection idle, closing");
                return None;
            }
        }
    }
}
