/*
 * connection.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Minihttp, a minimal HTTP/1.1 client engine.
 *
 * Minihttp is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Minihttp is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Minihttp.  If not, see <http://www.gnu.org/licenses/>.
 */

//! HTTP connection: one open stream plus its read buffer. Writes a request message and drives
//! the H1 parser to a buffered `Response`.

use bytes::{Bytes, BytesMut};
use log::{debug, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{HttpError, Result};
use crate::net::{Connection, SecureChannel};
use crate::protocol::http::h1::{BodyMode, H1ResponseHandler, ParseState, ResponseParser};
use crate::protocol::http::headers::HeaderMap;
use crate::protocol::http::response::Response;

/// Collects parser events into a `Response`. Body pieces are kept in arrival order and joined
/// once the body is complete.
#[derive(Default)]
struct ResponseCollector {
    status: Option<u16>,
    headers: HeaderMap,
    chunks: Vec<Bytes>,
}

impl H1ResponseHandler for ResponseCollector {
    fn status(&mut self, code: Option<u16>) {
        self.status = code;
    }

    fn header(&mut self, name: &str, value: &str) {
        self.headers.set(name, value);
    }

    fn body_chunk(&mut self, data: Bytes) {
        self.chunks.push(data);
    }
}

impl ResponseCollector {
    fn into_response(mut self) -> Response {
        let body = match self.chunks.len() {
            0 => Bytes::new(),
            1 => self.chunks.pop().unwrap_or_default(),
            _ => {
                let total = self.chunks.iter().map(Bytes::len).sum();
                let mut body = BytesMut::with_capacity(total);
                for chunk in &self.chunks {
                    body.extend_from_slice(chunk);
                }
                body.freeze()
            }
        };
        Response {
            status: self.status,
            headers: self.headers,
            body,
        }
    }
}

/// Captures the status of a CONNECT response; headers are drained unread.
#[derive(Default)]
struct TunnelStatus {
    status: Option<u16>,
}

impl H1ResponseHandler for TunnelStatus {
    fn status(&mut self, code: Option<u16>) {
        self.status = code;
    }

    fn header(&mut self, _name: &str, _value: &str) {}

    fn body_chunk(&mut self, _data: Bytes) {}
}

pub struct HttpConnection {
    conn: Connection,
    read_buf: BytesMut,
    read_size: usize,
    parser: ResponseParser,
}

impl HttpConnection {
    pub fn new(conn: Connection, read_size: usize) -> Self {
        Self {
            conn,
            read_buf: BytesMut::with_capacity(read_size),
            read_size: read_size.max(1),
            parser: ResponseParser::new(),
        }
    }

    pub(crate) fn is_secure(&self) -> bool {
        self.conn.is_secure()
    }

    /// Write a whole message and flush.
    pub async fn write_message(&mut self, message: &[u8]) -> Result<()> {
        self.conn.write_all(message).await?;
        self.conn.flush().await?;
        Ok(())
    }

    /// Read more bytes into the buffer. Returns 0 at end of stream.
    async fn fill(&mut self) -> Result<usize> {
        self.read_buf.reserve(self.read_size);
        Ok(self.conn.read_buf(&mut self.read_buf).await?)
    }

    /// Read and parse one complete response. Bytes after its end are not read.
    pub async fn read_response(&mut self) -> Result<Response> {
        self.parser.reset();
        let mut collector = ResponseCollector::default();
        loop {
            self.parser.receive(&mut self.read_buf, &mut collector)?;
            match self.parser.state() {
                ParseState::HeadersComplete => {
                    let mode = BodyMode::from_headers(&collector.headers);
                    debug!("response status {:?}, body {:?}", collector.status, mode);
                    self.parser.set_body_mode(mode);
                    continue;
                }
                ParseState::Done => break,
                _ => {}
            }
            if self.fill().await? == 0 {
                self.parser.finish()?;
                break;
            }
        }
        Ok(collector.into_response())
    }

    /// Read a CONNECT response head one byte at a time, so nothing past the blank line is
    /// consumed from the stream. Returns the status code, if any.
    pub async fn read_tunnel_response(&mut self) -> Result<Option<u16>> {
        self.parser.reset();
        let mut handler = TunnelStatus::default();
        let mut byte = [0u8; 1];
        // receive keeps a partial line in read_buf; only another byte can complete it.
        while self.parser.state() != ParseState::HeadersComplete {
            let n = self.conn.read(&mut byte).await?;
            if n == 0 {
                return Err(HttpError::tunnel(
                    "proxy closed the connection before the end of the CONNECT response",
                ));
            }
            self.read_buf.extend_from_slice(&byte[..n]);
            self.parser
                .receive(&mut self.read_buf, &mut handler)
                .map_err(|e| HttpError::tunnel(e.to_string()))?;
        }
        Ok(handler.status)
    }

    /// Upgrade to a secure channel addressed to `host`. Nothing may be buffered unread.
    pub async fn upgrade<S: SecureChannel>(self, channel: &S, host: &str, port: u16) -> Result<Self> {
        if !self.read_buf.is_empty() {
            return Err(HttpError::tunnel("unexpected data before secure channel upgrade"));
        }
        let read_size = self.read_size;
        let conn = self
            .conn
            .upgrade(channel, host, port)
            .await
            .map_err(|e| HttpError::connect(host, port, e))?;
        Ok(Self::new(conn, read_size))
    }

    /// Close the connection. Errors are logged, not returned: the exchange result stands.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!("error closing connection: {}", e);
        }
    }
}
