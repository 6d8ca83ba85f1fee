// crates/podsync-server/src/client.rs
// Handles both the JSON-lines and the text codec; the first byte decides.

use std::sync::Arc;

use bytes::BytesMut;
use podsync_core::{ClientMessage, ConnectionId, ServerMessage};
use podsync_protocol::{Codec, MAX_FRAME_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::JoinAuthorizer;
use crate::service::StatusService;
use crate::types::{ConnectionTable, OutboundRx, OutboundTx, SharedRooms};

/// Everything a connection task needs from the server.
#[derive(Clone)]
pub(crate) struct ConnectionContext {
    pub clients: ConnectionTable,
    pub rooms: SharedRooms,
    pub authorizer: Arc<dyn JoinAuthorizer>,
    pub service: StatusService,
}

/// Run the I/O loop for a single connection until EOF, error or shutdown.
///
/// Always leaves the connection table and every joined room before
/// returning.
pub(crate) async fn run_client(
    conn_id: ConnectionId,
    stream: TcpStream,
    ctx: ConnectionContext,
    out_tx: OutboundTx,
    out_rx: OutboundRx,
    shutdown: CancellationToken,
) {
    let codec = tokio::select! {
        _ = shutdown.cancelled() => None,
        codec = detect_codec(&stream) => codec,
    };

    if let Some(codec) = codec {
        debug!(%conn_id, ?codec, "codec selected");

        let (read_half, write_half) = stream.into_split();
        let writer = tokio::spawn(run_writer(conn_id, codec, write_half, out_rx));

        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(%conn_id, "closing connection for shutdown");
            }
            _ = run_reader(conn_id, codec, read_half, &ctx, &out_tx) => {}
        }

        cleanup(conn_id, &ctx).await;

        // Our own sender is the last one once the table entry is gone,
        // so dropping it lets the writer drain and finish.
        drop(out_tx);
        if let Err(e) = writer.await {
            warn!(%conn_id, error = %e, "writer task failed");
        }
    } else {
        cleanup(conn_id, &ctx).await;
    }

    info!(%conn_id, "client disconnected");
}

async fn detect_codec(stream: &TcpStream) -> Option<Codec> {
    let mut first = [0u8; 1];
    match stream.peek(&mut first).await {
        Ok(0) => None,
        Ok(_) => Some(Codec::detect(first[0])),
        Err(e) => {
            warn!(error = %e, "failed to read first byte");
            None
        }
    }
}

async fn run_reader(
    conn_id: ConnectionId,
    codec: Codec,
    mut read_half: OwnedReadHalf,
    ctx: &ConnectionContext,
    out_tx: &OutboundTx,
) {
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        match read_half.read_buf(&mut buffer).await {
            Ok(0) => {
                debug!(%conn_id, "peer closed the connection");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(%conn_id, error = %e, "read error");
                return;
            }
        }

        // Process complete lines.
        while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
            let line = buffer.split_to(newline_pos + 1);
            let line = String::from_utf8_lossy(&line);

            match codec.decode_client(&line) {
                Ok(Some(msg)) => handle_message(conn_id, msg, ctx, out_tx).await,
                Ok(None) => {}
                Err(e) => {
                    debug!(%conn_id, error = %e, "rejected frame");
                    let _ = out_tx.send(ServerMessage::Error(e.to_string())).await;
                }
            }
        }

        if buffer.len() > MAX_FRAME_LEN {
            warn!(%conn_id, buffered = buffer.len(), "frame exceeds limit; dropping connection");
            let _ = out_tx.send(ServerMessage::Error("frame too long".to_string())).await;
            return;
        }
    }
}

async fn handle_message(
    conn_id: ConnectionId,
    msg: ClientMessage,
    ctx: &ConnectionContext,
    out_tx: &OutboundTx,
) {
    let reply = match msg {
        ClientMessage::Join(room) => match ctx.authorizer.authorize(conn_id, &room) {
            Ok(()) => {
                let added = ctx.rooms.write().await.join(conn_id, room.clone());
                debug!(%conn_id, %room, added, "joined room");
                ServerMessage::Joined(room)
            }
            Err(denied) => {
                info!(%conn_id, %room, reason = %denied, "join rejected");
                ServerMessage::join_rejected(room, denied.reason)
            }
        },
        ClientMessage::Leave(room) => {
            let removed = ctx.rooms.write().await.leave(conn_id, &room);
            debug!(%conn_id, %room, removed, "left room");
            ServerMessage::Left(room)
        }
        ClientMessage::UpdatePod(update) => {
            match ctx
                .service
                .update_pod_status(&update.pod_id, update.status)
                .await
            {
                Ok(()) => return,
                Err(e) => ServerMessage::Error(e.to_string()),
            }
        }
        ClientMessage::UpdateBooking(update) => {
            match ctx
                .service
                .update_booking_status(&update.booking_id, update.status)
                .await
            {
                Ok(()) => return,
                Err(e) => ServerMessage::Error(e.to_string()),
            }
        }
        ClientMessage::Ping => ServerMessage::Pong,
    };

    // Replies wait for queue space, so a client that stops reading stalls
    // only its own reader.
    if out_tx.send(reply).await.is_err() {
        debug!(%conn_id, "writer gone; reply dropped");
    }
}

async fn run_writer(
    conn_id: ConnectionId,
    codec: Codec,
    mut write_half: OwnedWriteHalf,
    mut out_rx: OutboundRx,
) {
    while let Some(msg) = out_rx.recv().await {
        let line = match codec.encode_server(&msg) {
            Ok(line) => line,
            Err(e) => {
                warn!(%conn_id, error = %e, "failed to encode outbound message");
                continue;
            }
        };

        if let Err(e) = write_half.write_all(line.as_bytes()).await {
            warn!(%conn_id, error = %e, "write error");
            break;
        }
    }

    let _ = write_half.shutdown().await;
}

async fn cleanup(conn_id: ConnectionId, ctx: &ConnectionContext) {
    let left = ctx.rooms.write().await.disconnect(conn_id);
    if !left.is_empty() {
        debug!(%conn_id, rooms = left.len(), "removed from rooms on disconnect");
    }
    ctx.clients.write().await.remove(&conn_id);
}
