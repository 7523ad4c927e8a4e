/*
 * writer.rs
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

//! HTTP/1.1 request serialization: request line, headers in order, blank line, raw body.
//!
//! Default headers are computed from the request and route into a fresh header list; the
//! caller's request is never modified, so building twice yields the same bytes.

use crate::protocol::http::headers::{names, HeaderMap};
use crate::protocol::http::proxy::Proxy;
use crate::protocol::http::request::{Credentials, Request};
use crate::protocol::http::resolve::Route;
use crate::uri;

/// Headers to send: the caller's, in order, followed by any defaults they did not set.
pub fn request_headers(
    request: &Request,
    route: &Route,
    proxy: Option<&Proxy>,
    user_agent: Option<&str>,
) -> HeaderMap {
    let mut headers = request.headers.clone();
    headers.set_if_absent(names::HOST, route.endpoint_host());
    headers.set_if_absent(names::ACCEPT, "*/*");
    if let Some(body) = &request.body {
        headers.set_if_absent(names::CONTENT_LENGTH, body.len().to_string());
    }
    if let Some(credentials) = &request.credentials {
        headers.set_if_absent(names::AUTHORIZATION, credentials.basic_header_value());
    }
    if route.uses_absolute_form() {
        if let Some(credentials) = proxy.and_then(|p| p.credentials.as_ref()) {
            headers.set_if_absent(names::PROXY_AUTHORIZATION, credentials.basic_header_value());
        }
    }
    if let Some(user_agent) = user_agent {
        headers.set_if_absent(names::USER_AGENT, user_agent);
    }
    headers
}

fn write_head(out: &mut Vec<u8>, request_line: &str, headers: &HeaderMap) {
    out.extend_from_slice(request_line.as_bytes());
    out.extend_from_slice(b"\r\n");
    headers.write_to(out);
    out.extend_from_slice(b"\r\n");
}

/// The full request message, ready to write.
pub fn build_request(
    request: &Request,
    route: &Route,
    proxy: Option<&Proxy>,
    user_agent: Option<&str>,
) -> Vec<u8> {
    let headers = request_headers(request, route, proxy, user_agent);
    let request_line = format!("{} {} HTTP/1.1", request.method, route.request_target());
    let body_len = request.body.as_ref().map_or(0, |b| b.len());
    let mut out = Vec::with_capacity(256 + body_len);
    write_head(&mut out, &request_line, &headers);
    if let Some(body) = &request.body {
        out.extend_from_slice(body);
    }
    out
}

/// `CONNECT host:port HTTP/1.1` with Host, Proxy-Connection, and optional Proxy-Authorization.
pub fn build_connect_request(host: &str, port: u16, credentials: Option<&Credentials>) -> Vec<u8> {
    let authority = uri::authority(host, port);
    let mut headers = HeaderMap::new();
    headers.set(names::HOST, authority.as_str());
    headers.set(names::PROXY_CONNECTION, "Keep-Alive");
    if let Some(credentials) = credentials {
        headers.set(names::PROXY_AUTHORIZATION, credentials.basic_header_value());
    }
    let mut out = Vec::with_capacity(128);
    write_head(&mut out, &format!("CONNECT {} HTTP/1.1", authority), &headers);
    out
}
