//! Outbound collaborators: payload transport and public-IP lookup.
//!
//! The core treats the transport as a "send bytes, get success/failure"
//! primitive. Any non-2xx response and any network error are the same thing
//! to the delivery pipeline: a retryable failure.

use std::io::Write;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Deserialize;

use crate::error::TransportError;

/// Payload transport collaborator.
pub trait Transport {
    /// Deliver `body` (JSON bytes, possibly gzip-compressed) to `url`.
    fn send(&self, url: &str, body: &[u8], gzipped: bool) -> Result<(), TransportError>;
}

/// Public-IP lookup collaborator.
pub trait IpResolver {
    fn resolve(&self) -> Result<String, TransportError>;
}

/// Replace the trailing run of ASCII digits with `0` (IPv4-style masking of
/// the last octet). Strings without a numeric tail pass through unchanged.
pub fn anonymize_ip(ip: &str) -> String {
    let tail_digits = ip.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    if tail_digits == 0 {
        return ip.to_string();
    }
    let mut out = ip[..ip.len() - tail_digits].to_string();
    out.push('0');
    out
}

/// Gzip a payload body.
pub fn gzip(body: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

/// Blocking HTTP transport over reqwest.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, url: &str, body: &[u8], gzipped: bool) -> Result<(), TransportError> {
        let mut req = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_vec());
        if gzipped {
            req = req.header("Content-Encoding", "gzip");
        }
        let resp = req
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Http {
                status: status.as_u16(),
            })
        }
    }
}

#[derive(Deserialize)]
struct IpifyResponse {
    ip: String,
}

/// Public-IP lookup against an ipify-style JSON endpoint.
pub struct HttpIpResolver {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpIpResolver {
    pub const DEFAULT_URL: &'static str = "https://api.ipify.org?format=json";

    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl IpResolver for HttpIpResolver {
    fn resolve(&self) -> Result<String, TransportError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
            });
        }
        let parsed: IpifyResponse = resp
            .json()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(parsed.ip)
    }
}
