/*
 * lib.rs
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

//! Minimal HTTP/1.1 client engine.
//!
//! Speaks the wire protocol directly over a byte stream: builds request messages, parses
//! status line and headers, reads Content-Length or chunked bodies, and tunnels through a
//! forward proxy with CONNECT before upgrading to TLS.
//!
//! ```no_run
//! # async fn run() -> minihttp_core::Result<()> {
//! use minihttp_core::protocol::http::{exchange, Proxy, Request};
//!
//! let request = Request::get("https://example.com/")?;
//! let proxy = Proxy::parse("http://proxy.local:3128")?;
//! let response = exchange(&request, Some(&proxy)).await?;
//! println!("{:?} {}", response.status, response.text());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod net;
pub mod protocol;
pub mod uri;

pub use config::ClientOptions;
pub use error::{HttpError, Result};
