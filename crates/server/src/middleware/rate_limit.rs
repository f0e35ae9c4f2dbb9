//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the generation endpoint is limited: it is the one call billed per
//! use by the text provider, so a misbehaving client can run up real cost.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor that reads the client IP from standard proxy headers.
///
/// The server is expected to sit behind a reverse proxy; `X-Forwarded-For`
/// (first hop) is tried first, then `X-Real-IP`. Without either header all
/// requests share the loopback key, so an unproxied deployment still
/// limits globally instead of failing requests.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // X-Real-IP
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the generation endpoint: ~10 requests per minute
/// per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn generation_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    #[test]
    fn test_extracts_forwarded_for_first_hop() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .expect("request");
        let key = ProxyIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_falls_back_to_real_ip() {
        let req = Request::builder()
            .header("x-real-ip", "198.51.100.4")
            .body(())
            .expect("request");
        let key = ProxyIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key.to_string(), "198.51.100.4");
    }

    #[test]
    fn test_no_headers_falls_back_to_loopback() {
        let req = Request::builder().body(()).expect("request");
        let key = ProxyIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key.to_string(), "127.0.0.1");
    }
}
