/*
 * response.rs
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

//! HTTP response: status code (if one could be parsed), headers, buffered body.

use bytes::Bytes;

use crate::protocol::http::headers::HeaderMap;

#[derive(Debug, Clone, Default)]
pub struct Response {
    /// None when the status line had no parsable code.
    pub status: Option<u16>,
    /// Header names are stored lower-cased.
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }

    /// Body decoded as UTF-8; invalid sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
