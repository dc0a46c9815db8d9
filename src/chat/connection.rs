//! Byte stream to line plumbing for one TCP connection.
//!
//! [`LineFramer`] is an incremental splitter that accepts arbitrary chunks and
//! yields whole lines. Any of `\n`, `\r\n` or `\r` ends a line, and a `\r\n`
//! pair split across two reads still counts as one terminator. Each connection
//! gets a reader task feeding [`ServerEvent`]s to the server and a writer task
//! draining its [`Outbound`] queue.
use bytes::{Buf, BytesMut};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};

use super::session::{Outbound, SessionId};
use crate::logutil::escape_log;

/// What the per-connection reader tasks report to the server task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Line { id: SessionId, line: String },
    /// `abrupt` is set for transport errors; a clean EOF is graceful.
    Disconnected { id: SessionId, abrupt: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTooLong;

pub struct LineFramer {
    buf: BytesMut,
    max_line_len: usize,
    /// The previous line ended in `\r`; a leading `\n` belongs to it.
    skip_lf: bool,
}

impl LineFramer {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
            max_line_len: max_line_len.max(1),
            skip_lf: false,
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Next complete line without its terminator. Invalid UTF-8 is replaced.
    pub fn next_line(&mut self) -> Result<Option<String>, LineTooLong> {
        if self.skip_lf && !self.buf.is_empty() {
            if self.buf[0] == b'\n' {
                self.buf.advance(1);
            }
            self.skip_lf = false;
        }

        let Some(end) = self.buf.iter().position(|b| *b == b'\n' || *b == b'\r') else {
            if self.buf.len() > self.max_line_len {
                return Err(LineTooLong);
            }
            return Ok(None);
        };
        if end > self.max_line_len {
            return Err(LineTooLong);
        }

        let raw = self.buf.split_to(end);
        let terminator = self.buf[0];
        self.buf.advance(1);
        if terminator == b'\r' {
            if self.buf.is_empty() {
                self.skip_lf = true;
            } else if self.buf[0] == b'\n' {
                self.buf.advance(1);
            }
        }
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    /// Whatever is left once the peer stops sending, as a final line.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Read lines until EOF, error or `closed` fires, forwarding them as events.
/// Every exit except a dropped event channel ends with
/// [`ServerEvent::Disconnected`].
pub async fn read_lines<R: AsyncRead + Unpin>(
    mut reader: R,
    id: SessionId,
    max_line_len: usize,
    events: mpsc::UnboundedSender<ServerEvent>,
    mut closed: oneshot::Receiver<()>,
) {
    let mut framer = LineFramer::new(max_line_len);
    let mut chunk = [0u8; 1024];
    let abrupt = loop {
        let n = tokio::select! {
            _ = &mut closed => {
                trace!("Reader for {} stopped by writer", id);
                break true;
            }
            res = reader.read(&mut chunk) => res,
        };
        match n {
            Ok(0) => {
                if let Some(line) = framer.finish() {
                    let _ = events.send(ServerEvent::Line { id, line });
                }
                break false;
            }
            Ok(n) => {
                framer.push(&chunk[..n]);
                let mut failed = false;
                loop {
                    match framer.next_line() {
                        Ok(Some(line)) => {
                            trace!("<- {} {}", id, escape_log(&line));
                            if events.send(ServerEvent::Line { id, line }).is_err() {
                                return;
                            }
                        }
                        Ok(None) => break,
                        Err(LineTooLong) => {
                            debug!("Session {} sent a line over {} bytes", id, max_line_len);
                            failed = true;
                            break;
                        }
                    }
                }
                if failed {
                    break true;
                }
            }
            Err(e) => {
                debug!("Read error on {}: {}", id, e);
                break true;
            }
        }
    };
    let _ = events.send(ServerEvent::Disconnected { id, abrupt });
}

/// Drain the outbound queue onto the socket. Ends on [`Outbound::Close`],
/// when the queue closes, or on a write error.
pub async fn write_lines<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    closed: oneshot::Sender<()>,
) {
    while let Some(msg) = outbound.recv().await {
        match msg {
            Outbound::Line(line) => {
                let mut bytes = line.into_bytes();
                bytes.extend_from_slice(b"\r\n");
                if let Err(e) = writer.write_all(&bytes).await {
                    debug!("Write error: {}", e);
                    break;
                }
            }
            Outbound::Close => break,
        }
    }
    let _ = writer.flush().await;
    let _ = writer.shutdown().await;
    let _ = closed.send(());
}
