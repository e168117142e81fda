//! Length-prefixed framing
//!
//! Format: 8-byte big-endian length + payload. Raw file transfers reuse the
//! 8-byte size header but have no further framing.

use crate::error::ProtocolError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Length of the size header (8 bytes, big-endian u64).
pub const LENGTH_PREFIX_LEN: usize = 8;

/// Frame payloads are read at most this many bytes at a time.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Buffer size for streaming file contents.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Default upper bound on a single frame (1 GiB).
pub const DEFAULT_MAX_FRAME_BYTES: u64 = 1 << 30;

/// Reads and writes frames on any async byte stream.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_frame_bytes: u64,
}

impl FrameCodec {
    pub fn new(max_frame_bytes: u64) -> Self {
        Self { max_frame_bytes }
    }

    pub fn max_frame_bytes(&self) -> u64 {
        self.max_frame_bytes
    }

    fn check_len(&self, len: u64) -> Result<(), ProtocolError> {
        if len > self.max_frame_bytes {
            return Err(ProtocolError::FrameTooLarge {
                len,
                max: self.max_frame_bytes,
            });
        }
        Ok(())
    }

    /// Write one frame and flush.
    pub async fn write_frame<W>(&self, writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
    where
        W: AsyncWrite + Unpin,
    {
        let len = payload.len() as u64;
        self.check_len(len)?;
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(payload).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read one 8-byte size header.
    pub async fn read_length<R>(&self, reader: &mut R) -> Result<u64, ProtocolError>
    where
        R: AsyncRead + Unpin,
    {
        let mut header = [0u8; LENGTH_PREFIX_LEN];
        let received = read_full(reader, &mut header).await?;
        if received < LENGTH_PREFIX_LEN {
            return Err(ProtocolError::ConnectionClosed {
                expected: LENGTH_PREFIX_LEN as u64,
                received: received as u64,
            });
        }
        Ok(u64::from_be_bytes(header))
    }

    /// Read one frame, looping over short reads until the declared length
    /// has been accumulated.
    ///
    /// The declared length is checked against the limit before anything is
    /// allocated, and the buffer grows with the bytes actually received.
    pub async fn read_frame<R>(&self, reader: &mut R) -> Result<Vec<u8>, ProtocolError>
    where
        R: AsyncRead + Unpin,
    {
        let len = self.read_length(reader).await?;
        self.check_len(len)?;

        let mut payload = Vec::with_capacity(len.min(STREAM_CHUNK_SIZE as u64) as usize);
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        while (payload.len() as u64) < len {
            let want = (len - payload.len() as u64).min(READ_CHUNK_SIZE as u64) as usize;
            let n = reader.read(&mut chunk[..want]).await?;
            if n == 0 {
                return Err(ProtocolError::ConnectionClosed {
                    expected: len,
                    received: payload.len() as u64,
                });
            }
            payload.extend_from_slice(&chunk[..n]);
        }
        Ok(payload)
    }

    /// Send `len` bytes from `source` behind a raw size header.
    ///
    /// Not subject to the frame limit; file size is bounded by the file.
    pub async fn write_sized<R, W>(
        &self,
        writer: &mut W,
        source: &mut R,
        len: u64,
    ) -> Result<u64, ProtocolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&len.to_be_bytes()).await?;
        let sent = tokio::io::copy(&mut source.take(len), writer).await?;
        if sent != len {
            // Source shrank after its size was announced
            return Err(ProtocolError::IoError(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("source ended after {} of {} bytes", sent, len),
            )));
        }
        writer.flush().await?;
        Ok(sent)
    }

    /// Receive a raw sized stream into `sink`, returning the byte count.
    pub async fn read_sized<R, W>(&self, reader: &mut R, sink: &mut W) -> Result<u64, ProtocolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let len = self.read_length(reader).await?;
        let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
        let mut received = 0u64;
        while received < len {
            let want = (len - received).min(STREAM_CHUNK_SIZE as u64) as usize;
            let n = reader.read(&mut buf[..want]).await?;
            if n == 0 {
                return Err(ProtocolError::ConnectionClosed {
                    expected: len,
                    received,
                });
            }
            sink.write_all(&buf[..n]).await?;
            received += n as u64;
        }
        sink.flush().await?;
        Ok(received)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

/// Fill `buf` unless EOF comes first; returns how many bytes were read.
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<usize, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
