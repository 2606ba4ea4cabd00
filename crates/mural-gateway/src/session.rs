//! Per-connection session engine — read loop, ordered write draining,
//! canvas-broadcast forwarding, teardown.
//!
//! Each session owns three tasks: the read loop (this function's own
//! context), a writer draining the outbound frame queue one write at a
//! time, and a forwarder that marshals canvas change notifications onto
//! the queue. The queue is the only thing they share, so no session
//! state is ever touched from a foreign context.

use std::sync::Arc;

use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use mural_core::protocol::{OutboundFrame, PixelCommand};

use crate::state::GatewayState;

/// Drive one upgraded connection to completion.
pub async fn run(state: Arc<GatewayState>, socket: WebSocket) {
    let conn_id = Uuid::new_v4();
    let open = state.connection_opened();
    info!(%conn_id, open, "client connected");

    let (ws_tx, ws_rx) = socket.split();

    // Outbound frame queue: strict FIFO, two producers (ack path and
    // broadcast forwarder), one consumer (the writer task).
    let (frame_tx, frame_rx) = mpsc::unbounded_channel::<OutboundFrame>();

    let writer = tokio::spawn(drain_frames(ws_tx, frame_rx, conn_id));

    // Canvas changes are signalled from whatever context performed the
    // write; the forwarder receives them on this session's behalf and
    // enqueues the snapshot, so the queue is never touched from a
    // foreign context.
    let mut subscription = state.store.subscribe();
    let store = state.store.clone();
    let snapshot_tx = frame_tx.clone();
    let forwarder = tokio::spawn(async move {
        while subscription.changed().await {
            let snap = store.snapshot().await;
            if snapshot_tx.send(OutboundFrame::snapshot(snap)).is_err() {
                break;
            }
        }
        subscription.dispose();
    });

    read_loop(&state, conn_id, ws_rx, &frame_tx).await;

    // Stop the forwarder before anything else: once its subscription is
    // gone, no further notification can reach this session.
    forwarder.abort();
    drop(frame_tx);
    // The writer drains whatever is still queued, then performs the
    // protocol-level close.
    let _ = writer.await;

    let open = state.connection_closed();
    info!(%conn_id, open, "client disconnected");
}

/// Read phase: await inbound frames until the stream ends, the client
/// closes, or the transport fails. Validation failures and unexpected
/// frame types are logged and the loop continues; a bad command must
/// never stall the session.
async fn read_loop(
    state: &Arc<GatewayState>,
    conn_id: Uuid,
    mut ws_rx: SplitStream<WebSocket>,
    frame_tx: &mpsc::UnboundedSender<OutboundFrame>,
) {
    while let Some(next) = ws_rx.next().await {
        let msg = match next {
            Ok(msg) => msg,
            Err(e) => {
                error!(%conn_id, %e, "read failed");
                break;
            }
        };

        match msg {
            Message::Text(text) => handle_command(state, conn_id, &text, frame_tx).await,
            Message::Binary(_) => {
                // Binary is server-to-client only, not a command format
                warn!(%conn_id, "binary frame on command channel, discarding");
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Axum answers pings itself
            }
            Message::Close(_) => {
                debug!(%conn_id, "client requested close");
                break;
            }
        }
    }
}

/// Parse one text frame as a pixel command and apply it. Malformed
/// payloads are dropped without a reply.
async fn handle_command(
    state: &Arc<GatewayState>,
    conn_id: Uuid,
    text: &str,
    frame_tx: &mpsc::UnboundedSender<OutboundFrame>,
) {
    let cmd: PixelCommand = match serde_json::from_str(text) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!(%conn_id, %e, "dropping malformed command");
            return;
        }
    };

    // The ack goes on the queue before the write so the snapshot
    // broadcast triggered by this mutation can never overtake it.
    if frame_tx.send(OutboundFrame::ack()).is_err() {
        return;
    }

    if let Err(e) = state.store.set(cmd.x, cmd.y, cmd.color).await {
        warn!(%conn_id, %e, "pixel write rejected");
    }
}

/// Drain phase: pop the front frame, issue exactly one write, and start
/// the next transmission only after that write completes. When every
/// producer is gone and the queue is empty, close the protocol; the
/// transport is never shut down independently of the close handshake.
async fn drain_frames(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut frame_rx: mpsc::UnboundedReceiver<OutboundFrame>,
    conn_id: Uuid,
) {
    while let Some(frame) = frame_rx.recv().await {
        debug!(
            %conn_id,
            kind = frame.kind(),
            bytes = frame.len(),
            pending = frame_rx.len(),
            "writing frame"
        );
        let msg = match frame {
            OutboundFrame::Text(text) => Message::Text(text.into()),
            OutboundFrame::Binary(bytes) => Message::Binary(bytes.into()),
        };
        if let Err(e) = ws_tx.send(msg).await {
            debug!(%conn_id, %e, "write failed");
            break;
        }
    }

    let close = Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: Utf8Bytes::from_static(""),
    }));
    let _ = ws_tx.send(close).await;
}
