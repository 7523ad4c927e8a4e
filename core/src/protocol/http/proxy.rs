/*
 * proxy.rs
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

//! Forward proxy descriptor.

use crate::error::{HttpError, Result};
use crate::protocol::http::request::Credentials;
use crate::uri::{decode_component, parse_http_url};

/// A forward HTTP proxy. The port is always explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    pub hostname: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
}

impl Proxy {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            credentials: None,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Parse `http://[user[:password]@]host:port`. A port must be present.
    pub fn parse(input: &str) -> Result<Self> {
        let url = parse_http_url(input)?;
        let port = url
            .port()
            .filter(|p| *p > 0)
            .or_else(|| explicit_default_port(input, url.scheme()))
            .ok_or_else(|| HttpError::InvalidProxy(format!("{} has no port", input)))?;
        let hostname = url.host_str().unwrap_or_default().to_string();
        let credentials = if url.username().is_empty() {
            None
        } else {
            Some(Credentials::new(
                decode_component(url.username()),
                decode_component(url.password().unwrap_or_default()),
            ))
        };
        Ok(Self {
            hostname,
            port,
            credentials,
        })
    }
}

/// The URL parser drops a port equal to the scheme default; recover it if it was written.
fn explicit_default_port(input: &str, scheme: &str) -> Option<u16> {
    let port = if scheme == "https" { 443 } else { 80 };
    let rest = input.split_once("://").map_or(input, |(_, r)| r);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    authority
        .ends_with(&format!(":{}", port))
        .then_some(port)
}
