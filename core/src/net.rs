/*
 * net.rs
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

//! Connection plumbing: raw TCP connect, TLS client config, and the secure-channel upgrade.
//!
//! A `Connection` is plain or secure; a plain connection can be upgraded in place of itself
//! (the old value is consumed) once the peer is ready, as after a proxy CONNECT.
//! Both primitives sit behind traits so the HTTP layer can be driven over any byte stream.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use rustls::client::ClientConfig;
use rustls::pki_types::ServerName;
use rustls::RootCertStore;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;

use crate::config::DEFAULT_CONNECT_TIMEOUT;

/// Any bidirectional byte stream the client can speak HTTP over.
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + ?Sized> AsyncStream for T {}

pub type BoxedStream = Box<dyn AsyncStream>;

/// Build a root certificate store: platform native certs first, then webpki-roots as fallback.
fn build_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    if let Ok(certs) = rustls_native_certs::load_native_certs() {
        for cert in certs {
            let _ = root_store.add(cert);
        }
    }
    if root_store.is_empty() {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    root_store
}

/// TLS client config for HTTP/1.1 (ALPN `http/1.1` only).
pub fn http_client_config() -> Arc<ClientConfig> {
    let mut config = ClientConfig::builder()
        .with_root_certificates(build_root_store())
        .with_no_client_auth();
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Arc::new(config)
}

static DEFAULT_CONNECTOR: OnceLock<TlsConnector> = OnceLock::new();

fn default_connector() -> &'static TlsConnector {
    DEFAULT_CONNECTOR.get_or_init(|| TlsConnector::from(http_client_config()))
}

/// Opens the raw byte stream to a host and port.
pub trait Transport: Send + Sync {
    fn connect<'a>(
        &'a self,
        host: &'a str,
        port: u16,
    ) -> impl Future<Output = io::Result<BoxedStream>> + Send + 'a;
}

/// Establishes a secure channel over an already-open stream, addressed to `host` for
/// certificate validation.
pub trait SecureChannel: Send + Sync {
    fn establish<'a>(
        &'a self,
        stream: BoxedStream,
        host: &'a str,
        port: u16,
    ) -> impl Future<Output = io::Result<BoxedStream>> + Send + 'a;
}

/// TCP transport with a connect timeout.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl Transport for TcpTransport {
    async fn connect<'a>(&'a self, host: &'a str, port: u16) -> io::Result<BoxedStream> {
        let addr = format!("{}:{}", host, port);
        let tcp = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TCP connect timed out"))??;
        tcp.set_nodelay(true)?;
        Ok(Box::new(tcp))
    }
}

/// rustls secure channel. Uses the shared default connector unless built with a custom config.
#[derive(Clone)]
pub struct RustlsChannel {
    connector: TlsConnector,
}

impl RustlsChannel {
    pub fn with_config(config: Arc<ClientConfig>) -> Self {
        Self {
            connector: TlsConnector::from(config),
        }
    }
}

impl Default for RustlsChannel {
    fn default() -> Self {
        Self {
            connector: default_connector().clone(),
        }
    }
}

impl SecureChannel for RustlsChannel {
    async fn establish<'a>(
        &'a self,
        stream: BoxedStream,
        host: &'a str,
        _port: u16,
    ) -> io::Result<BoxedStream> {
        let name = host.trim_start_matches('[').trim_end_matches(']');
        let server_name = ServerName::try_from(name)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?
            .to_owned();
        let tls = self
            .connector
            .connect(server_name, stream)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
        Ok(Box::new(tls))
    }
}

/// One open connection, owned by a single exchange. Implements AsyncRead + AsyncWrite.
pub struct Connection {
    stream: BoxedStream,
    secure: bool,
}

impl Connection {
    /// Open a connection, plain or secure. When secure, `host` is the name the certificate must match.
    pub async fn open<T, S>(
        transport: &T,
        channel: &S,
        host: &str,
        port: u16,
        secure: bool,
    ) -> io::Result<Self>
    where
        T: Transport,
        S: SecureChannel,
    {
        let stream = transport.connect(host, port).await?;
        let conn = Self {
            stream,
            secure: false,
        };
        if secure {
            conn.upgrade(channel, host, port).await
        } else {
            Ok(conn)
        }
    }

    /// Upgrade this plain connection to a secure channel. Consumes `self`; all further I/O goes
    /// through the returned connection.
    pub async fn upgrade<S: SecureChannel>(
        self,
        channel: &S,
        host: &str,
        port: u16,
    ) -> io::Result<Self> {
        let stream = channel.establish(self.stream, host, port).await?;
        Ok(Self {
            stream,
            secure: true,
        })
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Shut down the write side and drop the stream.
    pub async fn close(mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}

impl AsyncRead for Connection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for Connection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::{duplex, DuplexStream};

    /// Transport that hands out one prepared stream.
    pub(crate) struct OneShot(Mutex<Option<DuplexStream>>);

    impl Transport for OneShot {
        async fn connect<'a>(&'a self, _host: &'a str, _port: u16) -> io::Result<BoxedStream> {
            let stream = self.0.lock().unwrap().take();
            stream
                .map(|s| Box::new(s) as BoxedStream)
                .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "used"))
        }
    }

    /// Secure channel that records upgrades and passes bytes through.
    #[derive(Default)]
    pub(crate) struct PassThrough(pub(crate) Mutex<Vec<(String, u16)>>);

    impl SecureChannel for PassThrough {
        async fn establish<'a>(
            &'a self,
            stream: BoxedStream,
            host: &'a str,
            port: u16,
        ) -> io::Result<BoxedStream> {
            self.0.lock().unwrap().push((host.to_string(), port));
            Ok(stream)
        }
    }

    /// Secure channel whose handshake always fails.
    pub(crate) struct Refusing;

    impl SecureChannel for Refusing {
        async fn establish<'a>(
            &'a self,
            _stream: BoxedStream,
            _host: &'a str,
            _port: u16,
        ) -> io::Result<BoxedStream> {
            Err(io::Error::new(io::ErrorKind::InvalidData, "handshake failed"))
        }
    }

    /// Stream that accepts every write and fails every read.
    pub(crate) struct ResetOnRead;

    impl AsyncRead for ResetOnRead {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")))
        }
    }

    impl AsyncWrite for ResetOnRead {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Transport whose connections are reset as soon as they are read.
    pub(crate) struct Resetting;

    impl Transport for Resetting {
        async fn connect<'a>(&'a self, _host: &'a str, _port: u16) -> io::Result<BoxedStream> {
            Ok(Box::new(ResetOnRead))
        }
    }

    /// A transport for one connection, and the server end of it.
    pub(crate) fn one_shot() -> (OneShot, DuplexStream) {
        let (client, server) = duplex(4096);
        (OneShot(Mutex::new(Some(client))), server)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{one_shot, PassThrough};
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn open_plain_does_not_upgrade() {
        let (transport, mut server) = one_shot();
        let channel = PassThrough::default();
        let mut conn = Connection::open(&transport, &channel, "h", 80, false)
            .await
            .unwrap();
        assert!(!conn.is_secure());
        assert!(channel.0.lock().unwrap().is_empty());
        conn.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[tokio::test]
    async fn open_secure_upgrades_with_host() {
        let (transport, _server) = one_shot();
        let channel = PassThrough::default();
        let conn = Connection::open(&transport, &channel, "example.com", 443, true)
            .await
            .unwrap();
        assert!(conn.is_secure());
        assert_eq!(
            *channel.0.lock().unwrap(),
            vec![("example.com".to_string(), 443)]
        );
    }

    #[tokio::test]
    async fn second_connect_is_refused() {
        let (transport, _server) = one_shot();
        let channel = PassThrough::default();
        Connection::open(&transport, &channel, "h", 80, false)
            .await
            .unwrap();
        assert!(Connection::open(&transport, &channel, "h", 80, false)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn close_signals_eof_to_peer() {
        let (transport, mut server) = one_shot();
        let conn = Connection::open(&transport, &PassThrough::default(), "h", 80, false)
            .await
            .unwrap();
        conn.close().await.unwrap();
        let mut rest = Vec::new();
        assert_eq!(server.read_to_end(&mut rest).await.unwrap(), 0);
    }
}
