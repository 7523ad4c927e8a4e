/*
 * uri.rs
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

//! URL handling at the client boundary: parse once into a `Url`, then derive ports,
//! authorities, and request targets from it. Only `http` and `https` are accepted.

use log::debug;
use url::Url;

use crate::error::{HttpError, Result};

pub const HTTP_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;

/// Parse an http(s) URL. An explicit port that is not a number is dropped so the scheme
/// default applies.
pub fn parse_http_url(input: &str) -> Result<Url> {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::InvalidPort) => {
            let stripped = strip_port(input);
            debug!("ignoring invalid port in {}", input);
            Url::parse(&stripped).map_err(|source| HttpError::InvalidUrl {
                url: input.to_string(),
                source,
            })?
        }
        Err(source) => {
            return Err(HttpError::InvalidUrl {
                url: input.to_string(),
                source,
            })
        }
    };
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(HttpError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(HttpError::UnsupportedScheme(format!("{} has no host", input)));
    }
    Ok(url)
}

/// Remove the `:port` suffix of the authority (after any userinfo and IPv6 brackets).
fn strip_port(input: &str) -> String {
    let Some(scheme_end) = input.find("://") else {
        return input.to_string();
    };
    let auth_start = scheme_end + 3;
    let auth_end = input[auth_start..]
        .find(['/', '?', '#'])
        .map_or(input.len(), |i| auth_start + i);
    let authority = &input[auth_start..auth_end];
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host_part = &authority[host_start..];
    let search_from = host_part.rfind(']').unwrap_or(0);
    match host_part[search_from..].rfind(':') {
        Some(colon) => {
            let cut = auth_start + host_start + search_from + colon;
            format!("{}{}", &input[..cut], &input[auth_end..])
        }
        None => input.to_string(),
    }
}

/// True when the scheme asks for a secure channel.
pub fn is_secure(url: &Url) -> bool {
    url.scheme() == "https"
}

pub fn default_port(secure: bool) -> u16 {
    if secure {
        HTTPS_PORT
    } else {
        HTTP_PORT
    }
}

/// Explicit positive port, else the scheme default.
pub fn effective_port(url: &Url) -> u16 {
    match url.port() {
        Some(port) if port > 0 => port,
        _ => default_port(is_secure(url)),
    }
}

/// Host as it appears in the URL (IPv6 literals keep their brackets).
pub fn host(url: &Url) -> &str {
    url.host_str().unwrap_or_default()
}

/// `host:port`, as used by CONNECT and its Host header.
pub fn authority(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}

/// Origin-form request target: path, then `?query` and `#fragment` when present.
pub fn origin_form(url: &Url) -> String {
    let mut target = url.path().to_string();
    if target.is_empty() {
        target.push('/');
    }
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        target.push('#');
        target.push_str(fragment);
    }
    target
}

/// Absolute-form request target for a forward proxy: `scheme://host[:port]/path?query`.
pub fn absolute_form(url: &Url) -> String {
    let mut target = format!("{}://{}", url.scheme(), host(url));
    if let Some(port) = url.port() {
        target.push(':');
        target.push_str(&port.to_string());
    }
    target.push_str(url.path());
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}

/// Decode a percent-encoded URL component (userinfo).
pub fn decode_component(encoded: &str) -> String {
    percent_encoding::percent_decode_str(encoded)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_by_scheme() {
        let u = parse_http_url("http://example.com/").unwrap();
        assert_eq!(effective_port(&u), 80);
        assert!(!is_secure(&u));
        let u = parse_http_url("https://example.com/").unwrap();
        assert_eq!(effective_port(&u), 443);
        assert!(is_secure(&u));
    }

    #[test]
    fn explicit_port_wins() {
        let u = parse_http_url("https://example.com:8443/x").unwrap();
        assert_eq!(effective_port(&u), 8443);
        // default port written out is normalised away by the parser but still resolves the same
        let u = parse_http_url("http://example.com:80/").unwrap();
        assert_eq!(effective_port(&u), 80);
    }

    #[test]
    fn non_numeric_port_falls_back() {
        let u = parse_http_url("http://example.com:abc/path?q=1").unwrap();
        assert_eq!(host(&u), "example.com");
        assert_eq!(effective_port(&u), 80);
        assert_eq!(origin_form(&u), "/path?q=1");
        let u = parse_http_url("https://user:pw@example.com:x/").unwrap();
        assert_eq!(u.username(), "user");
        assert_eq!(effective_port(&u), 443);
    }

    #[test]
    fn zero_port_falls_back() {
        let u = parse_http_url("http://example.com:0/").unwrap();
        assert_eq!(effective_port(&u), 80);
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            parse_http_url("ftp://example.com/"),
            Err(HttpError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            parse_http_url("not a url"),
            Err(HttpError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn request_targets() {
        let u = parse_http_url("http://example.com:8080/a/b?x=1#frag").unwrap();
        assert_eq!(origin_form(&u), "/a/b?x=1#frag");
        assert_eq!(absolute_form(&u), "http://example.com:8080/a/b?x=1");
        let u = parse_http_url("http://example.com").unwrap();
        assert_eq!(origin_form(&u), "/");
        assert_eq!(absolute_form(&u), "http://example.com/");
    }

    #[test]
    fn ipv6_host_keeps_brackets() {
        let u = parse_http_url("http://[::1]:8080/").unwrap();
        assert_eq!(host(&u), "[::1]");
        assert_eq!(authority(host(&u), effective_port(&u)), "[::1]:8080");
        let u = parse_http_url("http://[::1]:zz/").unwrap();
        assert_eq!(effective_port(&u), 80);
    }

    #[test]
    fn decodes_userinfo() {
        assert_eq!(decode_component("p%40ss"), "p@ss");
    }
}
