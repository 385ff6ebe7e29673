//! 泛解析检测与过滤

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

use itertools::Itertools;
use log::debug;
use rand::Rng;

use crate::dns_resolver::Resolve;
use crate::model::{scan_target, ValidationResult, ValidationStatus};

/// 默认的随机探测次数
pub const DEFAULT_WILDCARD_PROBES: usize = 3;

const LABEL_PREFIXES: [&str; 3] = ["random", "test", "invalid"];

/// 泛解析特征：随机子域名解析出的全部IP
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WildcardSignature {
    ips: HashSet<IpAddr>,
}

impl WildcardSignature {
    /// 由观测到的IP集合创建
    pub fn new(ips: HashSet<IpAddr>) -> Self {
        WildcardSignature { ips }
    }

    /// 是否存在泛解析
    pub fn has_wildcard(&self) -> bool {
        !self.ips.is_empty()
    }

    /// 泛解析IP集合
    pub fn ips(&self) -> &HashSet<IpAddr> {
        &self.ips
    }

    /// IP是否属于泛解析集合
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.ips.contains(ip)
    }

    /// 结果是否应当作为泛解析误报丢弃
    ///
    /// 只比较DNS解析得到的IP，HTTP/HTTPS方式的结果没有IP，永远不会被过滤。
    pub fn filters(&self, result: &ValidationResult) -> bool {
        if !self.has_wildcard() || result.status != ValidationStatus::DnsResolved {
            return false;
        }
        result.ip.map_or(false, |ip| self.contains(&ip))
    }

    /// 排序后的IP列表，形如 `[1.2.3.4, 5.6.7.8]`
    pub fn describe(&self) -> String {
        format!("[{}]", self.ips.iter().sorted().join(", "))
    }
}

/// 泛解析检测器
pub struct WildcardDetector<R> {
    resolver: Arc<R>,
    probes: usize,
}

impl<R: Resolve> WildcardDetector<R> {
    /// `probes` 为随机子域名数量，至少为1
    pub fn new(resolver: Arc<R>, probes: usize) -> Self {
        WildcardDetector {
            resolver,
            probes: probes.max(1),
        }
    }

    /// 检测域名是否存在泛解析
    ///
    /// 任何一次随机探测解析失败都只当作"没有地址"，不重试。
    pub async fn detect(&self, domain: &str) -> WildcardSignature {
        let mut ips = HashSet::new();

        for label in generate_test_labels(self.probes) {
            let host = scan_target(&label, domain);
            match self.resolver.lookup(&host).await {
                Ok(addrs) => ips.extend(addrs),
                Err(e) => debug!("泛解析探测 {} 无结果: {}", host, e),
            }
        }

        WildcardSignature::new(ips)
    }
}

/// 生成几乎不可能存在的随机标签
fn generate_test_labels(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let timestamp = chrono::Utc::now().timestamp();
    let chars = b"abcdefghijklmnopqrstuvwxyz0123456789";

    (0..count)
        .map(|i| {
            let token: String = (0..10)
                .map(|_| chars[rng.gen_range(0..chars.len())] as char)
                .collect();
            format!(
                "{}{}{}{}",
                LABEL_PREFIXES[i % LABEL_PREFIXES.len()],
                timestamp,
                token,
                i
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 所有 *.wild.test 都解析到固定地址，其他域名解析失败
    struct WildResolver {
        queried: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Resolve for WildResolver {
        async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ProbeError> {
            self.queried.lock().unwrap().push(host.to_string());
            if host.ends_with(".wild.test") {
                Ok(vec!["10.0.0.1".parse().unwrap()])
            } else {
                Err(ProbeError::LookupFailure {
                    host: host.to_string(),
                    reason: "NXDOMAIN".to_string(),
                })
            }
        }
    }

    fn detector() -> WildcardDetector<WildResolver> {
        WildcardDetector::new(
            Arc::new(WildResolver {
                queried: Mutex::new(Vec::new()),
            }),
            DEFAULT_WILDCARD_PROBES,
        )
    }

    #[tokio::test]
    async fn test_detects_wildcard() {
        let detector = detector();
        let signature = detector.detect("wild.test").await;
        assert!(signature.has_wildcard());
        assert_eq!(signature.ips().len(), 1);
        assert_eq!(signature.describe(), "[10.0.0.1]");
        assert_eq!(detector.resolver.queried.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_no_wildcard_when_probes_fail() {
        let signature = detector().detect("example.com").await;
        assert!(!signature.has_wildcard());
        assert_eq!(signature.describe(), "[]");
    }

    #[test]
    fn test_labels_are_distinct_bare_labels() {
        let labels = generate_test_labels(3);
        assert_eq!(labels.len(), 3);
        assert!(labels[0].starts_with("random"));
        assert!(labels[1].starts_with("test"));
        assert!(labels[2].starts_with("invalid"));
        assert_eq!(labels.iter().collect::<HashSet<_>>().len(), 3);
        assert!(labels.iter().all(|l| !l.contains('.')));
    }

    #[test]
    fn test_filters_only_dns_results_in_signature() {
        let wild: IpAddr = "10.0.0.1".parse().unwrap();
        let other: IpAddr = "93.184.216.34".parse().unwrap();
        let signature = WildcardSignature::new([wild].into_iter().collect());

        assert!(signature.filters(&ValidationResult::dns_resolved("a", wild)));
        assert!(!signature.filters(&ValidationResult::dns_resolved("b", other)));
        assert!(!signature.filters(&ValidationResult::http_accessible("c")));
        assert!(!signature.filters(&ValidationResult::https_accessible("d")));

        let empty = WildcardSignature::default();
        assert!(!empty.filters(&ValidationResult::dns_resolved("a", wild)));
    }
}
