//! DNS解析

use std::net::IpAddr;

use async_trait::async_trait;
use log::{debug, warn};
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use crate::error::{ProbeError, ScanError};

/// 单次DNS查询
///
/// 扫描器、泛解析检测器都只依赖这个 trait，测试时可以替换成内存实现。
#[async_trait]
pub trait Resolve: Send + Sync {
    /// 解析完整域名，返回全部地址。没有地址时返回 `LookupFailure`。
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ProbeError>;
}

/// 基于 trust-dns 的解析器
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    /// 使用系统DNS配置，读取失败时回退到默认上游
    pub fn new() -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!("读取系统DNS配置失败，使用默认上游: {}", e);
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        DnsResolver { resolver }
    }

    /// 只使用指定的DNS服务器
    pub fn with_nameservers(nameservers: &[String]) -> Result<Self, ScanError> {
        let ips = nameservers
            .iter()
            .map(|s| {
                s.trim()
                    .parse::<IpAddr>()
                    .map_err(|_| ScanError::InvalidResolver(s.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let group = NameServerConfigGroup::from_ips_clear(&ips, 53, true);
        let config = ResolverConfig::from_parts(None, vec![], group);
        Ok(DnsResolver {
            resolver: TokioAsyncResolver::tokio(config, ResolverOpts::default()),
        })
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolve for DnsResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ProbeError> {
        let response = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|e| ProbeError::LookupFailure {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        let ips: Vec<IpAddr> = response.iter().collect();
        if ips.is_empty() {
            return Err(ProbeError::LookupFailure {
                host: host.to_string(),
                reason: "no address records".to_string(),
            });
        }

        debug!("{} -> {:?}", host, ips);
        Ok(ips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_invalid_nameserver() {
        let result = DnsResolver::with_nameservers(&["8.8.8.8".to_string(), "not-an-ip".to_string()]);
        match result {
            Err(ScanError::InvalidResolver(s)) => assert_eq!(s, "not-an-ip"),
            _ => panic!("expected InvalidResolver"),
        }
    }

    #[tokio::test]
    async fn test_accepts_ipv4_and_ipv6_nameservers() {
        let result = DnsResolver::with_nameservers(&[" 1.1.1.1 ".to_string(), "2606:4700:4700::1111".to_string()]);
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_reserved_tld_fails_lookup() {
        // .invalid 永远不会被解析（RFC 2606）
        let resolver = DnsResolver::new();
        let err = resolver.lookup("rsubscan-probe.invalid").await.unwrap_err();
        assert!(matches!(err, ProbeError::LookupFailure { .. }));
    }
}
