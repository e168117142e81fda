//! Client side of the protocol. One connection per request, no retries.

use crate::apply::FileSource;
use crate::diff::{DiffEntry, DiffResult};
use crate::error::ProtocolError;
use crate::protocol::codec::FrameCodec;
use crate::protocol::command::Command;
use crate::tree::node::Tree;
use crate::tree::snapshot;
use crate::types::RootScope;
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct HostClient {
    addr: String,
    codec: FrameCodec,
}

impl HostClient {
    pub fn new(addr: impl Into<String>, codec: FrameCodec) -> Self {
        Self {
            addr: addr.into(),
            codec,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn open(&self, command: Command) -> Result<TcpStream, ProtocolError> {
        let mut stream =
            TcpStream::connect(&self.addr)
                .await
                .map_err(|source| ProtocolError::Connect {
                    addr: self.addr.clone(),
                    source,
                })?;
        stream.write_all(&[command.as_byte()]).await?;
        Ok(stream)
    }

    /// Send `tree` to the host and receive the changes that make it match the
    /// host's tree of the same scope.
    #[instrument(skip(self, tree), fields(addr = %self.addr, scope = %tree.scope()))]
    pub async fn compare(&self, tree: &Tree) -> Result<DiffResult, ProtocolError> {
        let payload = snapshot::encode(tree)?;
        let mut stream = self.open(Command::compare_for(tree.scope())).await?;
        self.codec.write_frame(&mut stream, &payload).await?;

        let reply = self.codec.read_frame(&mut stream).await?;
        let result = DiffResult::decode(&reply)?;
        debug!(changes = result.len(), "Received diff");
        Ok(result)
    }

    /// Download one file into `dest`, overwriting it. Returns the byte count.
    #[instrument(skip(self, dest), fields(addr = %self.addr))]
    pub async fn fetch_file(
        &self,
        scope: RootScope,
        relative_path: &str,
        dest: &Path,
    ) -> Result<u64, ProtocolError> {
        let mut stream = self.open(Command::fetch_for(scope)).await?;
        self.codec
            .write_frame(&mut stream, relative_path.as_bytes())
            .await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let received = self.codec.read_sized(&mut stream, &mut file).await?;
        file.sync_all().await?;
        debug!(bytes = received, "Fetched file");
        Ok(received)
    }
}

#[async_trait]
impl FileSource for HostClient {
    async fn fetch(&self, entry: &DiffEntry, dest: &Path) -> Result<u64, ProtocolError> {
        self.fetch_file(entry.scope, &entry.relative_path, dest).await
    }
}
