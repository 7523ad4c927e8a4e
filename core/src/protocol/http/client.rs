/*
 * client.rs
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

//! HTTP client: one request/response exchange per call.
//!
//! resolve route -> open connection (CONNECT tunnel + secure upgrade when a proxy fronts an
//! https endpoint) -> write request -> read response -> close. The connection is owned by the
//! exchange and closed on every path; dropping the exchange future drops (and closes) it too.

use log::debug;
use tokio::time::timeout;

use crate::config::ClientOptions;
use crate::error::{HttpError, Result};
use crate::net::{Connection, RustlsChannel, SecureChannel, TcpTransport, Transport};
use crate::protocol::http::connection::HttpConnection;
use crate::protocol::http::h1::build_request;
use crate::protocol::http::proxy::Proxy;
use crate::protocol::http::request::Request;
use crate::protocol::http::resolve::{resolve, Route};
use crate::protocol::http::response::Response;
use crate::protocol::http::tunnel::open_tunnel;

/// HTTP client over TCP and rustls by default. Both primitives can be replaced with
/// `HttpClient::with_parts`.
pub struct HttpClient<T = TcpTransport, S = RustlsChannel> {
    transport: T,
    channel: S,
    options: ClientOptions,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_options(ClientOptions::default())
    }

    pub fn with_options(options: ClientOptions) -> Self {
        Self {
            transport: TcpTransport::new(options.connect_timeout),
            channel: RustlsChannel::default(),
            options,
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport, S: SecureChannel> HttpClient<T, S> {
    pub fn with_parts(transport: T, channel: S, options: ClientOptions) -> Self {
        Self {
            transport,
            channel,
            options,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform one exchange: send `request` (through `proxy` if given) and buffer the whole
    /// response. The request is not modified.
    pub async fn exchange(&self, request: &Request, proxy: Option<&Proxy>) -> Result<Response> {
        match self.options.exchange_timeout {
            Some(limit) => timeout(limit, self.run(request, proxy))
                .await
                .map_err(|_| HttpError::TimedOut)?,
            None => self.run(request, proxy).await,
        }
    }

    async fn run(&self, request: &Request, proxy: Option<&Proxy>) -> Result<Response> {
        let route = resolve(request, proxy);
        let mut conn = self.connect(&route, proxy).await?;
        let message = build_request(request, &route, proxy, self.options.user_agent.as_deref());
        debug!(
            "{} {} HTTP/1.1 (secure: {})",
            request.method,
            route.request_target(),
            conn.is_secure()
        );
        let result = Self::send(&mut conn, &message).await;
        conn.close().await;
        result
    }

    async fn send(conn: &mut HttpConnection, message: &[u8]) -> Result<Response> {
        conn.write_message(message).await?;
        conn.read_response().await
    }

    /// Open the connection for `route`. With a proxy in front of a secure endpoint, tunnel
    /// first and upgrade the tunnel; the pre-upgrade connection is consumed.
    async fn connect(&self, route: &Route, proxy: Option<&Proxy>) -> Result<HttpConnection> {
        debug!(
            "connecting to {}:{} (secure: {})",
            route.connect_host, route.connect_port, route.connect_secure
        );
        let conn = Connection::open(
            &self.transport,
            &self.channel,
            &route.connect_host,
            route.connect_port,
            route.connect_secure,
        )
        .await
        .map_err(|e| HttpError::connect(&route.connect_host, route.connect_port, e))?;
        let mut http = HttpConnection::new(conn, self.options.read_buffer_size);

        match proxy {
            Some(proxy) if route.needs_tunnel() => {
                if let Err(e) = open_tunnel(&mut http, route, proxy).await {
                    http.close().await;
                    return Err(e);
                }
                http.upgrade(&self.channel, route.endpoint_host(), route.endpoint_port())
                    .await
            }
            _ => Ok(http),
        }
    }
}

/// One exchange with a default client (TCP + rustls, default options).
pub async fn exchange(request: &Request, proxy: Option<&Proxy>) -> Result<Response> {
    HttpClient::new().exchange(request, proxy).await
}
