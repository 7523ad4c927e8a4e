/*
 * error.rs
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

//! Errors from resolving, connecting, tunnelling, and parsing an HTTP exchange.

use std::io;

use thiserror::Error;

/// Errors surfaced by [`HttpClient::exchange`](crate::protocol::http::HttpClient::exchange).
///
/// Every variant is fatal for the exchange it came from; nothing here is retried.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request or proxy URL could not be parsed.
    #[error("invalid url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// URL scheme other than http or https, or a URL with no host.
    #[error("unsupported url: {0}")]
    UnsupportedScheme(String),

    /// The proxy URL parsed but does not name a usable proxy (no explicit port).
    #[error("invalid proxy: {0}")]
    InvalidProxy(String),

    /// Could not open the connection (or the tunnelled secure channel).
    #[error("connect to {host}:{port} failed")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// The CONNECT exchange with the proxy did not complete or was refused.
    #[error("proxy tunnel failed: {0}")]
    ProxyTunnel(String),

    /// Malformed message framing (chunk size, chunk terminator, head line encoding).
    #[error("framing error: {0}")]
    Framing(String),

    /// The peer closed the stream where more data was required.
    #[error("truncated response: connection closed while reading {0}")]
    TruncatedStream(&'static str),

    /// The exchange deadline elapsed.
    #[error("exchange timed out")]
    TimedOut,

    #[error("io error")]
    Io(#[from] io::Error),
}

impl HttpError {
    pub(crate) fn framing(msg: impl Into<String>) -> Self {
        Self::Framing(msg.into())
    }

    pub(crate) fn tunnel(msg: impl Into<String>) -> Self {
        Self::ProxyTunnel(msg.into())
    }

    pub(crate) fn connect(host: &str, port: u16, source: io::Error) -> Self {
        Self::Connect {
            host: host.to_string(),
            port,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;
