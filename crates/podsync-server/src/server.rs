//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Binds the configured address/port.
//! - Owns the connection table and the room registry for the server's
//!   lifetime (created in [`Server::bind`], cleared when `run` returns).
//! - Accepts connections, assigns each a `ConnectionId`, and spawns the
//!   per-connection task from the `client` module.
//! - Stops accepting and winds every connection down when the shutdown
//!   token is cancelled.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use podsync_core::{ConnectionId, RoomRegistry};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::JoinAuthorizer;
use crate::client::{self, ConnectionContext};
use crate::config::Config;
use crate::emitter::EventEmitter;
use crate::service::StatusService;
use crate::store::{InMemoryStatusStore, StatusStore};
use crate::types::{ConnectionTable, OutboundRx, OutboundTx, ServerStats, SharedRooms};

/// A bound, not yet running, podsync server.
pub struct Server {
    listener: TcpListener,
    config: Config,
    ctx: ConnectionContext,
    emitter: EventEmitter,
    next_id: AtomicU64,
}

/// Cheap handle for code living next to the server: emit events, apply
/// status changes, read counters.
#[derive(Clone)]
pub struct ServerHandle {
    clients: ConnectionTable,
    rooms: SharedRooms,
    emitter: EventEmitter,
    service: StatusService,
}

impl Server {
    /// Bind with an in-memory status store and the configured room policy.
    pub async fn bind(config: Config) -> anyhow::Result<Self> {
        let authorizer: Arc<dyn JoinAuthorizer> = Arc::new(config.room_policy);
        Server::bind_with(config, Arc::new(InMemoryStatusStore::new()), authorizer).await
    }

    /// Bind with an explicit status store and join authorizer.
    pub async fn bind_with(
        config: Config,
        store: Arc<dyn StatusStore>,
        authorizer: Arc<dyn JoinAuthorizer>,
    ) -> anyhow::Result<Self> {
        let addr = config.socket_addr_string();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        let clients: ConnectionTable = Arc::new(RwLock::new(HashMap::new()));
        let rooms: SharedRooms = Arc::new(RwLock::new(RoomRegistry::new()));
        let emitter = EventEmitter::new(clients.clone(), rooms.clone());
        let service = StatusService::new(store, emitter.clone());

        Ok(Server {
            listener,
            config,
            ctx: ConnectionContext {
                clients,
                rooms,
                authorizer,
                service,
            },
            emitter,
            next_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound (useful with port `0`).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            clients: self.ctx.clients.clone(),
            rooms: self.ctx.rooms.clone(),
            emitter: self.emitter.clone(),
            service: self.ctx.service.clone(),
        }
    }

    fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Accept connections until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!(
            addr = %self.local_addr()?,
            max_clients = self.config.max_clients,
            policy = %self.config.room_policy,
            "listening"
        );

        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,

                Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = finished {
                        warn!(error = %e, "connection task panicked");
                    }
                }

                accepted = self.listener.accept() => {
                    let (stream, peer_addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                            continue;
                        }
                    };

                    let current_clients = self.ctx.clients.read().await.len();
                    if current_clients >= self.config.max_clients {
                        warn!(
                            %peer_addr,
                            max_clients = self.config.max_clients,
                            "rejecting connection: client limit reached"
                        );
                        // Just drop the stream; the client sees the connection closed.
                        continue;
                    }

                    if let Err(e) = stream.set_nodelay(true) {
                        debug!(%peer_addr, error = %e, "could not set TCP_NODELAY");
                    }

                    let conn_id = self.next_connection_id();
                    info!(%conn_id, %peer_addr, "accepted connection");

                    let (out_tx, out_rx): (OutboundTx, OutboundRx) =
                        mpsc::channel(self.config.outbound_queue.max(1));
                    self.ctx.clients.write().await.insert(conn_id, out_tx.clone());

                    tasks.spawn(client::run_client(
                        conn_id,
                        stream,
                        self.ctx.clone(),
                        out_tx,
                        out_rx,
                        shutdown.child_token(),
                    ));
                }
            }
        }

        info!(connections = tasks.len(), "shutting down");
        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                warn!(error = %e, "connection task panicked during shutdown");
            }
        }

        self.ctx.rooms.write().await.clear();
        self.ctx.clients.write().await.clear();
        info!("server stopped");

        Ok(())
    }
}

impl ServerHandle {
    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    pub fn service(&self) -> &StatusService {
        &self.service
    }

    pub async fn stats(&self) -> ServerStats {
        ServerStats {
            connections: self.clients.read().await.len(),
            rooms: self.rooms.read().await.room_count(),
        }
    }
}
