/*
 * tunnel.rs
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

//! CONNECT tunnel through a forward proxy: send `CONNECT host:port`, drain the proxy's
//! response head, and require a 2xx status before the tunnel is used.

use log::debug;

use crate::error::{HttpError, Result};
use crate::protocol::http::connection::HttpConnection;
use crate::protocol::http::h1::build_connect_request;
use crate::protocol::http::proxy::Proxy;
use crate::protocol::http::resolve::Route;

/// Negotiate the tunnel to the route's endpoint over `conn`, which must be connected to the
/// proxy. On return the stream carries raw bytes to the endpoint.
pub async fn open_tunnel(conn: &mut HttpConnection, route: &Route, proxy: &Proxy) -> Result<()> {
    let host = route.endpoint_host();
    let port = route.endpoint_port();
    debug!("CONNECT {}:{} via {}:{}", host, port, proxy.hostname, proxy.port);

    let to_connect_error = |e: HttpError| match e {
        HttpError::Io(source) => HttpError::connect(&proxy.hostname, proxy.port, source),
        other => other,
    };

    let request = build_connect_request(host, port, proxy.credentials.as_ref());
    conn.write_message(&request).await.map_err(to_connect_error)?;
    let status = conn.read_tunnel_response().await.map_err(to_connect_error)?;
    match status {
        Some(code) if (200..300).contains(&code) => {
            debug!("tunnel to {}:{} established ({})", host, port, code);
            Ok(())
        }
        Some(code) => Err(HttpError::tunnel(format!(
            "proxy refused CONNECT {}:{} with status {}",
            host, port, code
        ))),
        None => Err(HttpError::tunnel("proxy sent no status for CONNECT")),
    }
}
