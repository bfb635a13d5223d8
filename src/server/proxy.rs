//! Fallback reverse proxy for everything outside the gallery prefix.

use axum::body::{Body, HttpBody};
use axum::extract::Request;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::Uri;
use axum::response::Response;
use reqwest::Url;
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

use super::error::ServerError;

const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers that describe one connection and must not be forwarded.
const HOP_BY_HOP: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Forwards requests to a single upstream.
#[derive(Debug, Clone)]
pub struct Proxy {
    client: reqwest::Client,
    upstream: Url,
}

impl Proxy {
    pub fn new(upstream: Url) -> Result<Self, reqwest::Error> {
        // Redirects go back to the browser untouched
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, upstream })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// The upstream URL for an incoming request URI.
    ///
    /// The request path is appended to the upstream's own path and the query
    /// string is carried over unchanged.
    pub fn target_url(&self, uri: &Uri) -> Url {
        let mut url = self.upstream.clone();
        let base = self.upstream.path().trim_end_matches('/');
        url.set_path(&format!("{base}{}", uri.path()));
        url.set_query(uri.query());
        url
    }

    /// Send `req` upstream and stream the answer back.
    pub async fn forward(
        &self,
        req: Request,
        client: Option<SocketAddr>,
    ) -> Result<Response, ServerError> {
        let (parts, body) = req.into_parts();
        let url = self.target_url(&parts.uri);

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);
        if let Some(addr) = client {
            set_forwarded(&mut headers, addr.ip());
        }

        debug!(method = %parts.method, %url, "Proxying");
        let mut outgoing = self
            .client
            .request(parts.method, url)
            .headers(headers);
        if body.size_hint().exact() != Some(0) {
            outgoing = outgoing.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }
        let upstream = outgoing.send().await?;

        let mut response = Response::builder().status(upstream.status());
        if let Some(out) = response.headers_mut() {
            let mut incoming = upstream.headers().clone();
            strip_hop_by_hop(&mut incoming);
            out.extend(incoming);
        }
        Ok(response.body(Body::from_stream(upstream.bytes_stream()))?)
    }
}

/// Remove hop-by-hop headers, including any the `Connection` header names.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in HOP_BY_HOP.iter().chain(&listed) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

/// Set `X-Real-IP` and append to `X-Forwarded-For`.
pub fn set_forwarded(headers: &mut HeaderMap, ip: IpAddr) {
    let ip = ip.to_string();
    let chain = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) if !prior.trim().is_empty() => format!("{prior}, {ip}"),
        _ => ip.clone(),
    };
    if let Ok(value) = HeaderValue::from_str(&ip) {
        headers.insert(X_REAL_IP, value);
    }
    if let Ok(value) = HeaderValue::from_str(&chain) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
