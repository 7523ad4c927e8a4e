/*
 * headers.rs
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

//! Header container: case-insensitive names, insertion order preserved, one value per name.
//!
//! Names are indexed by their normalized form (trimmed, ASCII lower-case); the name as first
//! given is kept for serialization. Setting an existing name replaces the value in place.

use indexmap::IndexMap;

/// Header names the client reads or injects.
pub mod names {
    pub const HOST: &str = "Host";
    pub const ACCEPT: &str = "Accept";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const PROXY_AUTHORIZATION: &str = "Proxy-Authorization";
    pub const PROXY_CONNECTION: &str = "Proxy-Connection";
    pub const USER_AGENT: &str = "User-Agent";
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    /// normalized name -> (name as given, value)
    entries: IndexMap<String, (String, String)>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header. Replaces the value of an existing case-insensitive match, keeping its
    /// position; otherwise appends.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref();
        let value = value.into();
        match self.entries.get_mut(&normalize(name)) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries
                    .insert(normalize(name), (name.trim().to_string(), value));
            }
        }
    }

    /// Set only if no header of that name exists. Returns true if it was inserted.
    pub fn set_if_absent(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> bool {
        if self.has(name.as_ref()) {
            return false;
        }
        self.set(name, value);
        true
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize(name))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&normalize(name)).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order, as (name as given, value).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Append `name: value\r\n` for each entry, in order. CR and LF inside a name or value
    /// are dropped so no entry can end the line early.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        for (name, value) in self.iter() {
            if name.is_empty() {
                continue;
            }
            put_field(out, name);
            out.extend_from_slice(b": ");
            put_field(out, value);
            out.extend_from_slice(b"\r\n");
        }
    }
}

fn put_field(out: &mut Vec<u8>, field: &str) {
    out.extend(field.bytes().filter(|b| !matches!(b, b'\r' | b'\n')));
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in iter {
            map.set(name, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let mut h = HeaderMap::new();
        h.set("X-Custom-Thing", "1");
        for name in ["x-custom-thing", "X-CUSTOM-THING", "x-Custom-thing", " X-Custom-Thing "] {
            assert!(h.has(name), "{}", name);
            assert_eq!(h.get(name), Some("1"));
        }
        assert_eq!(h.get("x-other"), None);
        assert!(!h.has("x-other"));
    }

    #[test]
    fn set_replaces_in_place() {
        let mut h = HeaderMap::new();
        h.set("A", "1");
        h.set("B", "2");
        h.set("C", "3");
        h.set("b", "two");
        let entries: Vec<_> = h.iter().collect();
        assert_eq!(entries, vec![("A", "1"), ("B", "two"), ("C", "3")]);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn set_if_absent_keeps_existing() {
        let mut h = HeaderMap::new();
        h.set("accept", "text/html");
        assert!(!h.set_if_absent(names::ACCEPT, "*/*"));
        assert_eq!(h.get("Accept"), Some("text/html"));
        assert!(h.set_if_absent(names::HOST, "example.com"));
        assert_eq!(h.get("host"), Some("example.com"));
    }

    #[test]
    fn collects_from_pairs() {
        let h: HeaderMap = [("A", "1"), ("B", "2"), ("a", "3")].into_iter().collect();
        let entries: Vec<_> = h.iter().collect();
        assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn serializes_in_order() {
        let mut h = HeaderMap::new();
        h.set("Host", "example.com");
        h.set("Accept", "*/*");
        let mut out = Vec::new();
        h.write_to(&mut out);
        assert_eq!(out, b"Host: example.com\r\nAccept: */*\r\n");
    }

    #[test]
    fn line_breaks_cannot_inject_headers() {
        let mut h = HeaderMap::new();
        h.set("X-Note", "a\r\nInjected: yes");
        h.set("X-Bad\r\nName", "v\n");
        h.set("\r\n", "dropped");
        let mut out = Vec::new();
        h.write_to(&mut out);
        assert_eq!(out, b"X-Note: aInjected: yes\r\nX-BadName: v\r\n");
    }
}
