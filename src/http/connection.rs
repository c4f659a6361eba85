use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::http::writer::ResponseWriter;
use crate::server::Context;

const READ_CHUNK: usize = 4096;

/// One accepted socket, answered once and then closed.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    ctx: Arc<Context>,
    buffer: BytesMut,
    state: ConnectionState,
}

pub enum ConnectionState {
    Waiting,
    Reading,
    Processing,
    Writing(ResponseWriter),
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, ctx: Arc<Context>) -> Self {
        Self {
            stream,
            peer,
            ctx,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Waiting,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Waiting => {
                    if self.wait_for_data().await? {
                        self.state = ConnectionState::Reading;
                    } else {
                        // Nothing to answer yet; close silently.
                        tracing::debug!(peer = %self.peer, "No request data, closing");
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Reading => {
                    self.drain()?;
                    self.state = ConnectionState::Processing;
                }

                ConnectionState::Processing => {
                    let raw = String::from_utf8_lossy(&self.buffer).into_owned();
                    let Ok(response) = timeout(self.ctx.response_timeout, self.ctx.respond(&raw)).await else {
                        tracing::warn!(peer = %self.peer, "Response not ready before deadline, closing");
                        self.state = ConnectionState::Closed;
                        continue;
                    };

                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    let deadline = self.ctx.response_timeout;
                    if timeout(deadline, writer.write_to_stream(&mut self.stream)).await.is_err() {
                        tracing::warn!(peer = %self.peer, "Client stopped reading, closing");
                        self.state = ConnectionState::Closed;
                        continue;
                    }
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(peer = %self.peer, error = %e, "Shutdown after write failed");
                    }
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Polls for the first bytes of a request with growing intervals.
    ///
    /// Returns `false` when the wait budget runs out or the client hangs up
    /// before sending anything.
    async fn wait_for_data(&mut self) -> io::Result<bool> {
        for interval in self.ctx.wait.clone() {
            match timeout(interval, self.stream.readable()).await {
                Ok(ready) => ready?,
                Err(_elapsed) => continue,
            }

            self.buffer.reserve(READ_CHUNK);
            match self.stream.try_read_buf(&mut self.buffer) {
                Ok(0) => return Ok(false),
                Ok(_) => return Ok(true),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(false)
    }

    /// Reads whatever is available right now, without waiting for more.
    ///
    /// Input past `max_request_bytes` is read and dropped, up to one more
    /// limit's worth, so the socket is not closed with unread data.
    fn drain(&mut self) -> io::Result<()> {
        let limit = self.ctx.max_request_bytes;
        let mut dropped = self.buffer.len().saturating_sub(limit);
        self.buffer.truncate(limit);

        while dropped < limit {
            self.buffer.reserve(READ_CHUNK);
            match self.stream.try_read_buf(&mut self.buffer) {
                Ok(0) => break,
                Ok(_) => {
                    if self.buffer.len() > limit {
                        dropped += self.buffer.len() - limit;
                        self.buffer.truncate(limit);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        if dropped > 0 {
            tracing::debug!(peer = %self.peer, limit, dropped, "Request over size limit, excess dropped");
        }
        Ok(())
    }
}
