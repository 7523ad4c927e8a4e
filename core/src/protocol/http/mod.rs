/*
 * mod.rs
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

//! HTTP/1.1 client: one request/response exchange per call, optionally through a forward proxy.
//!
//! - Requests are built by value (`Request`) and serialized by `h1::build_request`.
//! - Responses are push-parsed (`h1::ResponseParser`) and buffered whole into `Response`.
//! - Buffers: `bytes` crate (BytesMut for the read buffer, Bytes for body pieces).
//! - Proxies: plain targets use absolute-form; https targets go through a CONNECT tunnel that
//!   is then upgraded to TLS.

mod connection;
mod headers;
mod proxy;
mod request;
mod resolve;
mod response;
mod tunnel;

pub mod client;
pub mod h1;

pub use client::{exchange, HttpClient};
pub use connection::HttpConnection;
pub use headers::{names, HeaderMap};
pub use proxy::Proxy;
pub use request::{Credentials, Method, Request};
pub use resolve::{resolve, Route};
pub use response::Response;
pub use tunnel::open_tunnel;
