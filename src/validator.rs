//! 单个候选子域名的 DNS → HTTP → HTTPS 校验链

use std::sync::Arc;

use log::debug;

use crate::dns_resolver::Resolve;
use crate::error::ProbeError;
use crate::model::{scan_target, ValidationResult};
use crate::verify::{Probe, Scheme};

/// 子域名校验器
///
/// 按 DNS → HTTP → HTTPS 的顺序探测，第一个成功的方式即为结果，
/// 后面的方式不再尝试。全部失败时记录DNS阶段的错误。
pub struct Validator<R, P> {
    resolver: Arc<R>,
    prober: Arc<P>,
}

impl<R: Resolve, P: Probe> Validator<R, P> {
    /// 使用共享的解析器和探测器创建校验器
    pub fn new(resolver: Arc<R>, prober: Arc<P>) -> Self {
        Validator { resolver, prober }
    }

    /// 依次尝试 DNS、HTTP、HTTPS，第一个成功的方式决定结果
    ///
    /// 全部失败时返回 `Failed`，错误取DNS解析的失败原因。
    pub async fn validate(&self, candidate: &str, target_domain: &str) -> ValidationResult {
        let host = scan_target(candidate, target_domain);

        let lookup_error = match self.resolver.lookup(&host).await {
            Ok(ips) if !ips.is_empty() => return ValidationResult::dns_resolved(candidate, ips[0]),
            Ok(_) => ProbeError::LookupFailure {
                host: host.clone(),
                reason: "no address records".to_string(),
            },
            Err(e) => e,
        };

        match self.prober.probe(Scheme::Http, &host).await {
            Ok(_) => return ValidationResult::http_accessible(candidate),
            Err(e) => debug!("{}", e),
        }

        match self.prober.probe(Scheme::Https, &host).await {
            Ok(_) => ValidationResult::https_accessible(candidate),
            Err(e) => {
                debug!("{}", e);
                ValidationResult::failed(candidate, lookup_error)
            }
        }
    }
}
