//! Host side: answers compare and fetch requests from clients
//!
//! Snapshots are built once before serving and shared read-only across
//! connection tasks.

use crate::config::{NetworkConfig, SyncConfig};
use crate::diff::diff;
use crate::error::{ApiError, ProtocolError};
use crate::protocol::codec::FrameCodec;
use crate::protocol::command::Command;
use crate::session::build_snapshot;
use crate::tree::node::Tree;
use crate::tree::{path, snapshot};
use crate::types::RootScope;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument, warn};

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct Host {
    install: Arc<Tree>,
    config: Option<Arc<Tree>>,
    codec: FrameCodec,
}

impl Host {
    pub fn new(install: Tree, config: Option<Tree>, codec: FrameCodec) -> Self {
        Self {
            install: Arc::new(install),
            config: config.map(Arc::new),
            codec,
        }
    }

    /// Build the install snapshot and, when a configuration root is set, the
    /// configuration snapshot.
    pub async fn prepare(config: &SyncConfig) -> Result<Self, ApiError> {
        config.roots.check_marker()?;

        let install =
            build_snapshot(&config.roots.install_root, RootScope::Install, &config.scan).await?;
        let config_tree = match &config.roots.config_root {
            Some(root) => Some(build_snapshot(root, RootScope::Config, &config.scan).await?),
            None => None,
        };

        info!(
            install_nodes = install.len(),
            config_nodes = config_tree.as_ref().map(Tree::len),
            "Host snapshots ready"
        );
        Ok(Self::new(
            install,
            config_tree,
            FrameCodec::new(config.network.max_frame_bytes),
        ))
    }

    /// Bind the configured listen address
    pub async fn bind(network: &NetworkConfig) -> Result<TcpListener, ProtocolError> {
        let addr = network.bind_addr();
        TcpListener::bind(&addr)
            .await
            .map_err(|source| ProtocolError::Bind { addr, source })
    }

    /// Snapshot served for `scope`, if any
    pub fn tree(&self, scope: RootScope) -> Option<&Tree> {
        match scope {
            RootScope::Install => Some(self.install.as_ref()),
            RootScope::Config => self.config.as_deref(),
        }
    }

    /// Accept connections forever. Each connection runs on its own task; a
    /// failing connection is logged and dropped, and accept errors (e.g. out of
    /// file descriptors) are logged and retried after a short pause.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> Result<(), ProtocolError> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "Serving snapshots");
        }
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "Client connected");
                    let host = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = host.handle_connection(stream).await {
                            warn!(%peer, error = %e, "Connection dropped");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    /// Serve exactly one request on `stream`.
    #[instrument(skip_all)]
    pub async fn handle_connection<S>(&self, mut stream: S) -> Result<(), ProtocolError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut byte = [0u8; 1];
        if stream.read(&mut byte).await? == 0 {
            return Err(ProtocolError::ConnectionClosed {
                expected: 1,
                received: 0,
            });
        }
        let command = Command::try_from(byte[0])?;
        debug!(%command, "Handling command");

        if command.is_compare() {
            self.compare(command.scope(), &mut stream).await
        } else {
            self.send_file(command.scope(), &mut stream).await
        }
    }

    async fn compare<S>(&self, scope: RootScope, stream: &mut S) -> Result<(), ProtocolError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let base = self
            .tree(scope)
            .ok_or(ProtocolError::ScopeUnavailable(scope))?;

        let payload = self.codec.read_frame(stream).await?;
        let other = snapshot::decode(&payload)?;
        let result = diff(base, &other);
        debug!(
            %scope,
            to_add = result.to_add.len(),
            to_modify = result.to_modify.len(),
            to_delete = result.to_delete.len(),
            "Compared snapshot"
        );

        self.codec.write_frame(stream, &result.encode()?).await
    }

    async fn send_file<S>(&self, scope: RootScope, stream: &mut S) -> Result<(), ProtocolError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let base = self
            .tree(scope)
            .ok_or(ProtocolError::ScopeUnavailable(scope))?;

        let payload = self.codec.read_frame(stream).await?;
        let relative_path = String::from_utf8(payload)
            .map_err(|_| ProtocolError::InvalidPath("path is not valid UTF-8".to_string()))?;
        let local = path::resolve_under(base.root_path(), &relative_path)
            .ok_or_else(|| ProtocolError::InvalidPath(relative_path.clone()))?;

        let mut file = tokio::fs::File::open(&local).await?;
        let len = file.metadata().await?.len();
        let sent = self.codec.write_sized(stream, &mut file, len).await?;
        debug!(%scope, path = %relative_path, bytes = sent, "Sent file");
        Ok(())
    }
}
