/*
 * resolve.rs
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

//! Decide where to connect: the request's host directly, or a forward proxy.

use url::Url;

use crate::protocol::http::proxy::Proxy;
use crate::protocol::http::request::Request;
use crate::uri;

/// Connection endpoint derived from a request and optional proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub connect_host: String,
    pub connect_port: u16,
    /// Whether the first leg (to `connect_host`) is a secure channel.
    pub connect_secure: bool,
    /// The request's own URL.
    pub endpoint_url: Url,
    pub via_proxy: bool,
}

impl Route {
    pub fn endpoint_secure(&self) -> bool {
        uri::is_secure(&self.endpoint_url)
    }

    pub fn endpoint_host(&self) -> &str {
        uri::host(&self.endpoint_url)
    }

    pub fn endpoint_port(&self) -> u16 {
        uri::effective_port(&self.endpoint_url)
    }

    /// A CONNECT tunnel is needed to reach a secure endpoint through a proxy.
    pub fn needs_tunnel(&self) -> bool {
        self.via_proxy && self.endpoint_secure()
    }

    /// Requests through a proxy over a plain connection use the absolute URL as target.
    pub fn uses_absolute_form(&self) -> bool {
        self.via_proxy && !self.connect_secure && !self.endpoint_secure()
    }

    /// Request-target for the request line.
    pub fn request_target(&self) -> String {
        if self.uses_absolute_form() {
            uri::absolute_form(&self.endpoint_url)
        } else {
            uri::origin_form(&self.endpoint_url)
        }
    }
}

/// Resolve the route. The proxy leg is always plain; only the endpoint leg is upgraded.
pub fn resolve(request: &Request, proxy: Option<&Proxy>) -> Route {
    let endpoint_url = request.url.clone();
    match proxy {
        Some(proxy) => Route {
            connect_host: proxy.hostname.clone(),
            connect_port: proxy.port,
            connect_secure: false,
            endpoint_url,
            via_proxy: true,
        },
        None => Route {
            connect_host: uri::host(&endpoint_url).to_string(),
            connect_port: uri::effective_port(&endpoint_url),
            connect_secure: uri::is_secure(&endpoint_url),
            endpoint_url,
            via_proxy: false,
        },
    }
}
