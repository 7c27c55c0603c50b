//! Probe target construction and validation.
//!
//! A `Target` is resolved once, before any sampling starts, and is
//! read-only for the rest of the run. An unresolvable host or an exhausted
//! port scan is fatal; no partial sampling happens.

use std::net::IpAddr;
use std::ops::RangeInclusive;
use std::time::Duration;

use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, info};

use crate::error::{Result, SamplerError};

pub const PORT_SCAN_RANGE: RangeInclusive<u16> = 1..=65535;
pub const DEFAULT_PORT_SCAN_TIMEOUT: Duration = Duration::from_millis(100);

/// One sampling destination, immutable after construction.
#[derive(Debug, Clone)]
pub struct Target {
    pub host: String,
    pub resolved_addr: IpAddr,
    pub port: Option<u16>,
    pub endpoint: String,
    pub duration: Duration,
}

impl Target {
    /// Resolve `input` (a bare host, IP, or scheme-qualified URL) and build
    /// the target. Fails fast with `AddressResolution` when nothing
    /// resolves.
    pub async fn resolve(
        input: &str,
        endpoint: &str,
        port: Option<u16>,
        duration: Duration,
    ) -> Result<Self> {
        let host = extract_host(input);
        let resolved_addr = resolve_host(&host).await?;
        info!(%host, %resolved_addr, "resolved probe target");

        Ok(Self {
            host,
            resolved_addr,
            port,
            endpoint: endpoint.trim().to_string(),
            duration,
        })
    }

    /// Make sure a usable TCP port is known, scanning for one if none was
    /// supplied. Scan exhaustion is fatal.
    pub async fn ensure_port(&mut self, connect_timeout: Duration) -> Result<u16> {
        if let Some(port) = self.port {
            return Ok(port);
        }
        info!(addr = %self.resolved_addr, "no port provided, scanning for an open port");
        let port = scan_ports(self.resolved_addr, PORT_SCAN_RANGE, connect_timeout).await?;
        self.port = Some(port);
        Ok(port)
    }

    /// Normalized download URL: plain http scheme, any leading
    /// `http://`/`https://`/`www.` stripped first, endpoint joined with a
    /// single slash.
    pub fn normalize_url(&self) -> String {
        normalize_url(&self.host, &self.endpoint)
    }
}

/// Pull the hostname out of a scheme-qualified URL, falling back to the raw
/// input for bare hosts and IPs.
pub fn extract_host(input: &str) -> String {
    let input = input.trim();
    if input.contains("://") {
        if let Ok(url) = reqwest::Url::parse(input) {
            if let Some(host) = url.host_str() {
                return host.to_string();
            }
        }
    }
    input.to_string()
}

async fn resolve_host(host: &str) -> Result<IpAddr> {
    let mut addrs = lookup_host((host, 0))
        .await
        .map_err(|_| SamplerError::AddressResolution {
            host: host.to_string(),
        })?;

    addrs
        .next()
        .map(|sock| sock.ip())
        .ok_or_else(|| SamplerError::AddressResolution {
            host: host.to_string(),
        })
}

/// A target string is acceptable when it carries scheme+host or resolves as
/// a bare name.
pub async fn validate_target(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }
    if input.contains("://") {
        return reqwest::Url::parse(input)
            .map(|url| url.host_str().is_some())
            .unwrap_or(false);
    }
    resolve_host(input).await.is_ok()
}

pub fn normalize_url(host: &str, endpoint: &str) -> String {
    let base = host
        .strip_prefix("http://")
        .or_else(|| host.strip_prefix("https://"))
        .or_else(|| host.strip_prefix("www."))
        .unwrap_or(host);

    let endpoint = endpoint.trim_start_matches('/');
    if endpoint.is_empty() {
        format!("http://{}", base)
    } else {
        format!("http://{}/{}", base, endpoint)
    }
}

/// Scan `range` in order against `addr`, returning the first port that
/// accepts a TCP connection within `connect_timeout`. The scan never runs
/// past the end of the range; exhaustion yields `PortUnavailable`.
pub async fn scan_ports(
    addr: IpAddr,
    range: RangeInclusive<u16>,
    connect_timeout: Duration,
) -> Result<u16> {
    for port in range {
        match tokio::time::timeout(connect_timeout, TcpStream::connect((addr, port))).await {
            Ok(Ok(_)) => {
                info!(port, "found open port");
                return Ok(port);
            }
            Ok(Err(err)) => debug!(port, %err, "port closed"),
            Err(_) => debug!(port, "connect timed out"),
        }
    }
    Err(SamplerError::PortUnavailable { addr })
}

/// Convenience wrapper scanning the full 1..=65535 range.
pub async fn find_open_port(addr: IpAddr, connect_timeout: Duration) -> Result<u16> {
    scan_ports(addr, PORT_SCAN_RANGE, connect_timeout).await
}

/// Parse a test duration: `"2m"` is minutes, `"90s"` is seconds, a bare
/// integer is seconds.
pub fn parse_duration(input: &str) -> Result<u64> {
    let input = input.trim().to_lowercase();
    let parse_int = |s: &str| {
        s.parse::<u64>()
            .map_err(|_| SamplerError::Parse(format!("invalid duration: '{}'", input)))
    };

    if let Some(minutes) = input.strip_suffix('m') {
        Ok(parse_int(minutes)? * 60)
    } else if let Some(seconds) = input.strip_suffix('s') {
        parse_int(seconds)
    } else {
        parse_int(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    #[test]
    fn parse_duration_accepts_all_three_forms() {
        assert_eq!(parse_duration("2m").unwrap(), 120);
        assert_eq!(parse_duration("90s").unwrap(), 90);
        assert_eq!(parse_duration("45").unwrap(), 45);
        assert_eq!(parse_duration(" 1M ").unwrap(), 60);
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn normalize_url_strips_one_leading_prefix() {
        assert_eq!(normalize_url("example.com", ""), "http://example.com");
        assert_eq!(
            normalize_url("https://example.com", "api/v1"),
            "http://example.com/api/v1"
        );
        assert_eq!(
            normalize_url("www.example.com", "/data"),
            "http://example.com/data"
        );
    }

    #[test]
    fn extract_host_handles_urls_and_bare_names() {
        assert_eq!(extract_host("https://example.com/path"), "example.com");
        assert_eq!(extract_host("192.168.1.2"), "192.168.1.2");
        assert_eq!(extract_host("  example.com "), "example.com");
    }

    #[tokio::test]
    async fn scan_finds_the_single_open_port() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let found = scan_ports(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            port..=port,
            Duration::from_millis(100),
        )
        .await
        .unwrap();
        assert_eq!(found, port);
    }

    #[tokio::test]
    async fn scan_exhaustion_reports_port_unavailable() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let open_port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = scan_ports(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            open_port..=open_port,
            Duration::from_millis(100),
        )
        .await;
        assert!(matches!(
            result,
            Err(SamplerError::PortUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn unresolvable_host_is_fatal() {
        let err = Target::resolve(
            "definitely-not-a-real-host.invalid",
            "",
            None,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn localhost_resolves() {
        let target = Target::resolve("127.0.0.1", "data", Some(80), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(target.resolved_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(target.normalize_url(), "http://127.0.0.1/data");
    }
}
