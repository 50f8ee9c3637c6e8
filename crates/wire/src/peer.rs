// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Symmetric RPC peer over any byte stream.
//!
//! Each side holds its own pending-request table keyed by opaque UUID ids.
//! The read loop dispatches inbound requests and notifications to an
//! [`RpcHandler`]; inbound responses resolve the matching pending entry.
//! Disconnect drains the table so no caller waits forever.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::codec::{read_message, write_message};
use crate::message::{RpcError, RpcMessage};

/// Errors from the transport layer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("malformed message: {detail} (line: {line:?})")]
    Malformed { line: String, detail: String },

    #[error("{0}")]
    Remote(RpcError),
}

/// Dispatch target for inbound traffic.
///
/// Handlers run on spawned tasks so a slow request never blocks the read
/// loop. Notification handlers have no way to respond, matching the
/// protocol rule that notifications are never answered.
#[async_trait]
pub trait RpcHandler: Send + Sync + 'static {
    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError>;

    async fn handle_notification(&self, method: &str, params: Value);
}

/// Handler that rejects every request and ignores every notification.
pub struct NoopHandler;

#[async_trait]
impl RpcHandler for NoopHandler {
    async fn handle_request(&self, method: &str, _params: Value) -> Result<Value, RpcError> {
        Err(RpcError::unknown_method(method))
    }

    async fn handle_notification(&self, _method: &str, _params: Value) {}
}

type PendingTable = Mutex<HashMap<String, oneshot::Sender<Result<Value, ProtocolError>>>>;

struct PeerShared {
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: PendingTable,
    closed: AtomicBool,
    default_timeout: Duration,
}

/// One side of an RPC connection. Cheap to clone; all clones share the
/// same pending table and write half.
#[derive(Clone)]
pub struct RpcPeer {
    shared: Arc<PeerShared>,
}

impl RpcPeer {
    /// Take ownership of a connected stream and start the read loop.
    pub fn spawn<S, H>(stream: S, handler: Arc<H>, default_timeout: Duration) -> RpcPeer
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
        H: RpcHandler,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let shared = Arc::new(PeerShared {
            writer: tokio::sync::Mutex::new(Box::new(write_half)),
            pending: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            default_timeout,
        });

        let peer = RpcPeer { shared: Arc::clone(&shared) };
        let loop_peer = peer.clone();
        tokio::spawn(async move {
            loop_peer.read_loop(read_half, handler).await;
        });
        peer
    }

    /// Send a request and await the matching response with the default
    /// timeout.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ProtocolError> {
        self.call_with_timeout(method, params, self.shared.default_timeout).await
    }

    /// Send a request and await the matching response.
    ///
    /// The id is removed from the pending table on every exit path, so ids
    /// are collision-free within a table generation.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ProtocolError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(ProtocolError::ConnectionClosed);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.shared.pending.lock().insert(id.clone(), tx);

        let request =
            RpcMessage::Request { id: id.clone(), method: method.to_string(), params };
        if let Err(e) = self.write(&request).await {
            self.shared.pending.lock().remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            // Sender dropped: table was drained by disconnect
            Ok(Err(_)) => Err(ProtocolError::ConnectionClosed),
            Err(_) => {
                self.shared.pending.lock().remove(&id);
                Err(ProtocolError::Timeout)
            }
        }
    }

    /// Send a notification (no response expected).
    pub async fn notify(&self, method: &str, params: Value) -> Result<(), ProtocolError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(ProtocolError::ConnectionClosed);
        }
        self.write(&RpcMessage::Notification { method: method.to_string(), params }).await
    }

    /// True once the read loop has observed EOF or a transport error.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Shut down the write half. The remote peer observes EOF and drains
    /// its pending table.
    pub async fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
        let mut writer = self.shared.writer.lock().await;
        let _ = writer.shutdown().await;
    }

    /// Number of requests currently awaiting responses.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().len()
    }

    async fn write(&self, message: &RpcMessage) -> Result<(), ProtocolError> {
        let mut writer = self.shared.writer.lock().await;
        write_message(&mut *writer, message).await
    }

    async fn read_loop<R, H>(&self, read_half: R, handler: Arc<H>)
    where
        R: AsyncRead + Send + Unpin + 'static,
        H: RpcHandler,
    {
        let mut reader = BufReader::new(read_half);
        loop {
            match read_message(&mut reader).await {
                Ok(message) => self.dispatch(message, &handler).await,
                Err(ProtocolError::Malformed { line, detail }) => {
                    warn!(detail, line, "skipping malformed message");
                }
                Err(ProtocolError::ConnectionClosed) => {
                    debug!("peer disconnected");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "transport error, closing connection");
                    break;
                }
            }
        }
        self.shared.closed.store(true, Ordering::Release);
        self.drain_pending();
    }

    /// Requests run on spawned tasks so a long handler (a tool run) never
    /// blocks the read loop. Notifications run inline: per-connection
    /// emission order is part of the channel contract, so they must not
    /// race each other. A notification handler therefore must not issue a
    /// request back over the same peer.
    async fn dispatch<H: RpcHandler>(&self, message: RpcMessage, handler: &Arc<H>) {
        match message {
            RpcMessage::Response { id, result } => {
                let entry = self.shared.pending.lock().remove(&id);
                match entry {
                    Some(tx) => {
                        let _ = tx.send(result.map_err(ProtocolError::Remote));
                    }
                    // Late response for a timed-out or cancelled request
                    None => debug!(id, "dropping response with no pending request"),
                }
            }
            RpcMessage::Request { id, method, params } => {
                let peer = self.clone();
                let handler = Arc::clone(handler);
                tokio::spawn(async move {
                    let result = handler.handle_request(&method, params).await;
                    let response = RpcMessage::Response { id, result };
                    if let Err(e) = peer.write(&response).await {
                        warn!(error = %e, method, "failed to write response");
                    }
                });
            }
            RpcMessage::Notification { method, params } => {
                handler.handle_notification(&method, params).await;
            }
        }
    }

    /// Fail every pending request with `ConnectionClosed`.
    fn drain_pending(&self) {
        let drained: Vec<_> = {
            let mut pending = self.shared.pending.lock();
            pending.drain().collect()
        };
        for (id, tx) in drained {
            debug!(id, "cancelling pending request: connection closed");
            let _ = tx.send(Err(ProtocolError::ConnectionClosed));
        }
    }
}

#[cfg(test)]
#[path = "peer_tests.rs"]
mod tests;
