//! Outbound transport selection and the single-shot fetch.
//!
//! Each fetch opens its own connection: TCP for `http`, TCP wrapped in
//! rustls for `https`. The connection driver runs on its own task and
//! lives exactly as long as the response body it produced.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response};
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_rustls::TlsConnector;
use url::{Host, Url};

use crate::config::RelayConfig;
use crate::relay::error::RelayError;

/// How the outbound request travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls,
}

impl Transport {
    /// Pick the transport from the target's scheme.
    pub fn for_url(url: &Url) -> Result<Self, RelayError> {
        match url.scheme() {
            "https" => Ok(Transport::Tls),
            "http" => Ok(Transport::Plain),
            other => Err(RelayError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Issues relayed GET requests.
#[derive(Clone)]
pub struct Upstream {
    tls: TlsConnector,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl Upstream {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let tls_config = rustls::ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self {
            tls: TlsConnector::from(Arc::new(tls_config)),
            connect_timeout: config.connect_timeout(),
            response_timeout: config.response_timeout(),
        })
    }

    /// GET `target` and return the response once its head has arrived.
    ///
    /// The body is left unread so the caller can stream it.
    pub async fn fetch(&self, target: &str) -> Result<Response<Incoming>, RelayError> {
        let url = Url::parse(target)?;
        let transport = Transport::for_url(&url)?;
        let host = url.host().ok_or(RelayError::MissingHost)?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| RelayError::UnsupportedScheme(url.scheme().to_string()))?;

        let request = Request::get(origin_form(&url))
            .header(header::HOST, host_header(&url))
            .body(Body::empty())?;

        // url renders IPv6 hosts bracketed, which is what ToSocketAddrs expects.
        let endpoint = format!("{host}:{port}");
        let deadline = Instant::now() + self.connect_timeout;

        let tcp = timeout_at(deadline, TcpStream::connect(&endpoint))
            .await
            .map_err(|_| self.connect_timeout_error(&endpoint))?
            .map_err(|source| RelayError::Connect {
                host: endpoint.clone(),
                source,
            })?;

        tracing::debug!(endpoint = %endpoint, transport = ?transport, "Upstream connected");

        match transport {
            Transport::Plain => self.send(tcp, request).await,
            Transport::Tls => {
                let name = server_name(host)?;
                let tls = timeout_at(deadline, self.tls.connect(name, tcp))
                    .await
                    .map_err(|_| self.connect_timeout_error(&endpoint))?
                    .map_err(|source| RelayError::Tls {
                        host: endpoint.clone(),
                        source,
                    })?;
                self.send(tls, request).await
            }
        }
    }

    async fn send<S>(&self, io: S, request: Request<Body>) -> Result<Response<Incoming>, RelayError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(io))
            .await
            .map_err(RelayError::Handshake)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "Upstream connection ended with error");
            }
        });

        timeout(self.response_timeout, sender.send_request(request))
            .await
            .map_err(|_| RelayError::ResponseTimeout(self.response_timeout))?
            .map_err(RelayError::Upstream)
    }

    fn connect_timeout_error(&self, endpoint: &str) -> RelayError {
        RelayError::ConnectTimeout {
            host: endpoint.to_string(),
            timeout: self.connect_timeout,
        }
    }
}

/// Path and query, as sent on the request line.
fn origin_form(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// `Host` header value; the port is only spelled out when non-default.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn server_name(host: Host<&str>) -> Result<ServerName<'static>, RelayError> {
    match host {
        Host::Domain(domain) => ServerName::try_from(domain.to_string())
            .map_err(|_| RelayError::InvalidServerName(domain.to_string())),
        Host::Ipv4(ip) => Ok(ServerName::from(IpAddr::V4(ip))),
        Host::Ipv6(ip) => Ok(ServerName::from(IpAddr::V6(ip))),
    }
}
