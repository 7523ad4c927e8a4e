/*
 * parser.rs
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

//! HTTP/1.1 response push parser: status line, headers, body (Content-Length or chunked).
//!
//! States: StatusLine -> Headers -> HeadersComplete -> (Body | ChunkSize..ChunkTrailer) -> Done.
//! The caller picks the body framing from the parsed headers at HeadersComplete.

use bytes::{Bytes, BytesMut};
use log::trace;

use crate::error::{HttpError, Result};
use crate::protocol::http::headers::{names, HeaderMap};

/// Longest status, header, or chunk-size line accepted.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Callback for HTTP/1.1 response events.
pub trait H1ResponseHandler {
    fn status(&mut self, code: Option<u16>);
    fn header(&mut self, name: &str, value: &str);
    fn body_chunk(&mut self, data: Bytes);
    fn trailer(&mut self, _name: &str, _value: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    StatusLine,
    Headers,
    /// Headers done; caller must call set_body_mode().
    HeadersComplete,
    Body,
    ChunkSize,
    ChunkData,
    /// Chunk payload read; expecting the empty line that ends it.
    ChunkDataEnd,
    ChunkTrailer,
    Done,
}

/// How the response body is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    None,
    Fixed(u64),
    Chunked,
}

impl BodyMode {
    /// Content-Length (positive integer) first, then `Transfer-Encoding: chunked`, else no body.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let content_length = headers
            .get(names::CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|n| *n > 0);
        if let Some(n) = content_length {
            return BodyMode::Fixed(n);
        }
        if headers.get(names::TRANSFER_ENCODING) == Some("chunked") {
            return BodyMode::Chunked;
        }
        BodyMode::None
    }
}

/// Push parser for one HTTP/1.1 response head and body. Feed bytes via `receive`.
pub struct ResponseParser {
    state: ParseState,
    /// Bytes left in the fixed body or current chunk.
    remaining: u64,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::StatusLine,
            remaining: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ParseState::StatusLine;
        self.remaining = 0;
    }

    /// Split one LF- or CRLF-terminated line off the front of buf, without its terminator.
    fn take_line(buf: &mut BytesMut) -> Result<Option<BytesMut>> {
        let Some(lf) = buf.iter().position(|&b| b == b'\n') else {
            if buf.len() > MAX_LINE_LEN {
                return Err(HttpError::framing("line too long"));
            }
            return Ok(None);
        };
        if lf > MAX_LINE_LEN {
            return Err(HttpError::framing("line too long"));
        }
        let mut line = buf.split_to(lf + 1);
        line.truncate(lf);
        if line.last() == Some(&b'\r') {
            line.truncate(lf - 1);
        }
        Ok(Some(line))
    }

    fn line_str<'a>(line: &'a [u8], what: &str) -> Result<&'a str> {
        std::str::from_utf8(line).map_err(|_| HttpError::framing(format!("invalid {} UTF-8", what)))
    }

    /// `name: value` split on the first colon. Lines without a colon are skipped.
    fn split_header(line: &str) -> Option<(String, &str)> {
        let colon = line.find(':')?;
        let name = line[..colon].trim().to_ascii_lowercase();
        let value = line[colon + 1..].trim();
        Some((name, value))
    }

    /// Second whitespace-separated token of the status line as a code, if it parses.
    pub fn parse_status_code(line: &str) -> Option<u16> {
        line.split_whitespace().nth(1).and_then(|s| s.parse::<u16>().ok())
    }

    /// Hex chunk size, ignoring any `;extension`.
    pub fn parse_chunk_size(line: &str) -> Result<u64> {
        let size = line.split(';').next().unwrap_or(line).trim();
        let invalid = || HttpError::framing(format!("invalid chunk size {:?}", line.trim()));
        if size.is_empty() || !size.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u64::from_str_radix(size, 16).map_err(|_| invalid())
    }

    /// Consume and parse as much as possible from buf. Partial lines stay in buf.
    /// Returns at HeadersComplete and Done without consuming further.
    pub fn receive<H: H1ResponseHandler>(
        &mut self,
        buf: &mut BytesMut,
        handler: &mut H,
    ) -> Result<()> {
        while !buf.is_empty() {
            match self.state {
                ParseState::StatusLine => {
                    let Some(line) = Self::take_line(buf)? else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        continue;
                    }
                    let line = Self::line_str(&line, "status line")?;
                    handler.status(Self::parse_status_code(line));
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    let Some(line) = Self::take_line(buf)? else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        self.state = ParseState::HeadersComplete;
                        return Ok(());
                    }
                    let line = Self::line_str(&line, "header")?;
                    if let Some((name, value)) = Self::split_header(line) {
                        trace!("< {}: {}", name, value);
                        handler.header(&name, value);
                    }
                }
                ParseState::HeadersComplete | ParseState::Done => return Ok(()),
                ParseState::Body => {
                    self.take_payload(buf, handler);
                    if self.remaining == 0 {
                        self.state = ParseState::Done;
                    }
                }
                ParseState::ChunkSize => {
                    let Some(line) = Self::take_line(buf)? else {
                        return Ok(());
                    };
                    let line = Self::line_str(&line, "chunk size")?;
                    self.remaining = Self::parse_chunk_size(line)?;
                    self.state = if self.remaining == 0 {
                        ParseState::ChunkTrailer
                    } else {
                        ParseState::ChunkData
                    };
                }
                ParseState::ChunkData => {
                    self.take_payload(buf, handler);
                    if self.remaining == 0 {
                        self.state = ParseState::ChunkDataEnd;
                    }
                }
                ParseState::ChunkDataEnd => {
                    let Some(line) = Self::take_line(buf)? else {
                        return Ok(());
                    };
                    if !line.is_empty() {
                        return Err(HttpError::framing("chunk data not followed by CRLF"));
                    }
                    self.state = ParseState::ChunkSize;
                }
                ParseState::ChunkTrailer => {
                    let Some(line) = Self::take_line(buf)? else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        self.state = ParseState::Done;
                        return Ok(());
                    }
                    let line = Self::line_str(&line, "trailer")?;
                    if let Some((name, value)) = Self::split_header(line) {
                        handler.trailer(&name, value);
                    }
                }
            }
        }
        Ok(())
    }

    fn take_payload<H: H1ResponseHandler>(&mut self, buf: &mut BytesMut, handler: &mut H) {
        let available = buf.len() as u64;
        let n = self.remaining.min(available) as usize;
        if n > 0 {
            handler.body_chunk(buf.split_to(n).freeze());
            self.remaining -= n as u64;
        }
    }

    /// Called by the connection after headers are received (state HeadersComplete).
    pub fn set_body_mode(&mut self, mode: BodyMode) {
        if self.state != ParseState::HeadersComplete {
            return;
        }
        match mode {
            BodyMode::None => self.state = ParseState::Done,
            BodyMode::Fixed(n) => {
                self.remaining = n;
                self.state = ParseState::Body;
            }
            BodyMode::Chunked => self.state = ParseState::ChunkSize,
        }
    }

    /// Called when the peer closed the stream. Ok if the response is complete.
    /// Trailers after the last chunk are optional, so EOF there ends the body.
    pub fn finish(&mut self) -> Result<()> {
        match self.state {
            ParseState::Done => Ok(()),
            ParseState::ChunkTrailer => {
                self.state = ParseState::Done;
                Ok(())
            }
            ParseState::StatusLine => Err(HttpError::TruncatedStream("status line")),
            ParseState::Headers | ParseState::HeadersComplete => {
                Err(HttpError::TruncatedStream("header block"))
            }
            ParseState::Body => Err(HttpError::TruncatedStream("body")),
            ParseState::ChunkSize | ParseState::ChunkData | ParseState::ChunkDataEnd => {
                Err(HttpError::TruncatedStream("chunked body"))
            }
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        status: Option<Option<u16>>,
        headers: HeaderMap,
        body: Vec<u8>,
        trailers: Vec<(String, String)>,
    }

    impl H1ResponseHandler for Recorder {
        fn status(&mut self, code: Option<u16>) {
            self.status = Some(code);
        }
        fn header(&mut self, name: &str, value: &str) {
            self.headers.set(name, value);
        }
        fn body_chunk(&mut self, data: Bytes) {
            self.body.extend_from_slice(&data);
        }
        fn trailer(&mut self, name: &str, value: &str) {
            self.trailers.push((name.to_string(), value.to_string()));
        }
    }

    /// Feed `input` in pieces of `step` bytes, choosing the body mode from the headers.
    fn parse(input: &[u8], step: usize) -> Result<Recorder> {
        let mut parser = ResponseParser::new();
        let mut rec = Recorder::default();
        let mut buf = BytesMut::new();
        for piece in input.chunks(step) {
            buf.extend_from_slice(piece);
            loop {
                parser.receive(&mut buf, &mut rec)?;
                if parser.state() == ParseState::HeadersComplete {
                    parser.set_body_mode(BodyMode::from_headers(&rec.headers));
                    continue;
                }
                break;
            }
            if parser.state() == ParseState::Done {
                return Ok(rec);
            }
        }
        parser.finish()?;
        Ok(rec)
    }

    #[test]
    fn content_length_body() {
        let input = b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\nhello world";
        for step in [1, 3, input.len()] {
            let rec = parse(input, step).unwrap();
            assert_eq!(rec.status, Some(Some(200)));
            assert_eq!(rec.body, b"hello world");
        }
    }

    #[test]
    fn chunked_body() {
        let input =
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        for step in [1, 7, input.len()] {
            let rec = parse(input, step).unwrap();
            assert_eq!(rec.body, b"hello world");
        }
    }

    #[test]
    fn chunk_extensions_and_trailers() {
        let input = b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n\
                      3;name=v\r\nabc\r\n0\r\nX-Sum: 1\r\n\r\n";
        let rec = parse(input, input.len()).unwrap();
        assert_eq!(rec.body, b"abc");
        assert_eq!(rec.trailers, vec![("x-sum".to_string(), "1".to_string())]);
    }

    #[test]
    fn invalid_chunk_size_is_framing_error() {
        let input = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n";
        assert!(matches!(parse(input, input.len()), Err(HttpError::Framing(_))));
    }

    #[test]
    fn chunk_size_is_hex_digits_only() {
        for line in ["+5", "-0", "0x5", " ", ";ext"] {
            assert!(
                matches!(ResponseParser::parse_chunk_size(line), Err(HttpError::Framing(_))),
                "{:?}",
                line
            );
        }
        assert_eq!(ResponseParser::parse_chunk_size("1aF").unwrap(), 0x1af);
        assert_eq!(ResponseParser::parse_chunk_size(" 5 ;x=1").unwrap(), 5);
    }

    #[test]
    fn missing_chunk_terminator_is_framing_error() {
        let input = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nabXY\r\n";
        assert!(matches!(parse(input, input.len()), Err(HttpError::Framing(_))));
    }

    #[test]
    fn status_code_parsing() {
        assert_eq!(ResponseParser::parse_status_code("HTTP/1.1 404 Not Found"), Some(404));
        assert_eq!(ResponseParser::parse_status_code("HTTP/1.1 200"), Some(200));
        assert_eq!(ResponseParser::parse_status_code("HTTP/1.1"), None);
        assert_eq!(ResponseParser::parse_status_code("HTTP/1.1 abc OK"), None);
    }

    #[test]
    fn unparsable_status_is_tolerated() {
        let rec = parse(b"garbage\r\n\r\n", 4).unwrap();
        assert_eq!(rec.status, Some(None));
        assert!(rec.body.is_empty());
    }

    #[test]
    fn headers_lower_cased_last_wins() {
        let input = b"HTTP/1.1 204 No Content\r\nX-A:  one \r\nx-a: two\r\nnocolon\r\n\r\n";
        let rec = parse(input, input.len()).unwrap();
        assert_eq!(rec.headers.len(), 1);
        assert_eq!(rec.headers.iter().next(), Some(("x-a", "two")));
    }

    #[test]
    fn bare_lf_lines() {
        let input = b"HTTP/1.1 200 OK\nContent-Length: 2\n\nok";
        let rec = parse(input, input.len()).unwrap();
        assert_eq!(rec.body, b"ok");
    }

    #[test]
    fn body_mode_priority() {
        let h: HeaderMap = [("content-length", "5"), ("transfer-encoding", "chunked")]
            .into_iter()
            .collect();
        assert_eq!(BodyMode::from_headers(&h), BodyMode::Fixed(5));
        let h: HeaderMap = [("content-length", "0"), ("transfer-encoding", "chunked")]
            .into_iter()
            .collect();
        assert_eq!(BodyMode::from_headers(&h), BodyMode::Chunked);
        let h: HeaderMap = [("transfer-encoding", "gzip, chunked")].into_iter().collect();
        assert_eq!(BodyMode::from_headers(&h), BodyMode::None);
        assert_eq!(BodyMode::from_headers(&HeaderMap::new()), BodyMode::None);
    }

    #[test]
    fn truncation_by_state() {
        assert!(matches!(
            parse(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort", 64),
            Err(HttpError::TruncatedStream("body"))
        ));
        assert!(matches!(
            parse(b"HTTP/1.1 200 OK\r\nHost: x\r\n", 64),
            Err(HttpError::TruncatedStream("header block"))
        ));
        assert!(matches!(
            parse(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhel", 64),
            Err(HttpError::TruncatedStream("chunked body"))
        ));
        assert!(matches!(parse(b"", 1), Err(HttpError::TruncatedStream("status line"))));
    }

    #[test]
    fn eof_after_last_chunk_is_complete() {
        let input = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nok\r\n0\r\n";
        let rec = parse(input, input.len()).unwrap();
        assert_eq!(rec.body, b"ok");
    }

    #[test]
    fn overlong_line_rejected() {
        let mut input = b"HTTP/1.1 200 OK\r\nX: ".to_vec();
        input.extend(std::iter::repeat(b'a').take(MAX_LINE_LEN + 1));
        assert!(matches!(parse(&input, input.len()), Err(HttpError::Framing(_))));
    }
}
