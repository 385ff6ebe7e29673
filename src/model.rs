//! 扫描结果的数据模型

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use crate::error::ProbeError;

/// 校验状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationStatus {
    /// 尚未校验
    NotValidated,
    /// DNS解析成功
    DnsResolved,
    /// HTTP可访问
    HttpAccessible,
    /// HTTPS可访问
    HttpsAccessible,
    /// 所有探测均失败
    Failed,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationStatus::NotValidated => "Not validated",
            ValidationStatus::DnsResolved => "DNS resolved",
            ValidationStatus::HttpAccessible => "HTTP accessible",
            ValidationStatus::HttpsAccessible => "HTTPS accessible",
            ValidationStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// 产生结果的探测方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationMethod {
    /// DNS解析
    Dns,
    /// HTTP请求
    Http,
    /// HTTPS请求
    Https,
}

impl fmt::Display for ValidationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationMethod::Dns => "DNS",
            ValidationMethod::Http => "HTTP",
            ValidationMethod::Https => "HTTPS",
        };
        f.write_str(s)
    }
}

/// 单个候选子域名的校验结果
///
/// 只能通过下面的构造函数创建，保证 `method` 仅在成功状态下存在，
/// `error` 仅在 `Failed` 状态下存在。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// 候选子域名标签，不含目标域名
    pub subdomain: String,
    /// 解析到的地址，仅DNS成功时存在
    pub ip: Option<IpAddr>,
    /// 校验状态
    pub status: ValidationStatus,
    /// 成功时使用的探测方式
    pub method: Option<ValidationMethod>,
    /// 失败原因，仅 `Failed` 时存在
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ProbeError>,
}

impl ValidationResult {
    /// 尚未校验的结果
    pub fn not_validated(subdomain: &str) -> Self {
        Self::with_status(subdomain, None, ValidationStatus::NotValidated, None)
    }

    /// DNS解析成功
    pub fn dns_resolved(subdomain: &str, ip: IpAddr) -> Self {
        Self::with_status(
            subdomain,
            Some(ip),
            ValidationStatus::DnsResolved,
            Some(ValidationMethod::Dns),
        )
    }

    /// HTTP可访问
    pub fn http_accessible(subdomain: &str) -> Self {
        Self::with_status(
            subdomain,
            None,
            ValidationStatus::HttpAccessible,
            Some(ValidationMethod::Http),
        )
    }

    /// HTTPS可访问
    pub fn https_accessible(subdomain: &str) -> Self {
        Self::with_status(
            subdomain,
            None,
            ValidationStatus::HttpsAccessible,
            Some(ValidationMethod::Https),
        )
    }

    /// 探测链全部失败
    pub fn failed(subdomain: &str, error: ProbeError) -> Self {
        ValidationResult {
            error: Some(error),
            ..Self::with_status(subdomain, None, ValidationStatus::Failed, None)
        }
    }

    fn with_status(
        subdomain: &str,
        ip: Option<IpAddr>,
        status: ValidationStatus,
        method: Option<ValidationMethod>,
    ) -> Self {
        ValidationResult {
            subdomain: subdomain.to_string(),
            ip,
            status,
            method,
            error: None,
        }
    }

    /// 是否为成功结果（用于"仅显示成功"视图）
    pub fn is_success(&self) -> bool {
        !matches!(
            self.status,
            ValidationStatus::Failed | ValidationStatus::NotValidated
        )
    }

    /// 是否为失败结果
    pub fn is_failed(&self) -> bool {
        self.status == ValidationStatus::Failed
    }

    /// 完整域名
    pub fn fqdn(&self, target_domain: &str) -> String {
        scan_target(&self.subdomain, target_domain)
    }

    /// IP的显示形式，未解析时为空字符串
    pub fn ip_display(&self) -> String {
        self.ip.map(|ip| ip.to_string()).unwrap_or_default()
    }

    /// 探测方式的显示形式，没有时为 `none`
    pub fn method_display(&self) -> String {
        self.method
            .map(|m| m.to_string())
            .unwrap_or_else(|| "none".to_string())
    }

    /// 发现子域名时推送的进度消息
    pub fn progress_line(&self, target_domain: &str) -> String {
        match self.ip {
            Some(ip) => format!(
                "Found subdomain: {} ({}) - {}",
                self.fqdn(target_domain),
                ip,
                self.status
            ),
            None => format!(
                "Found subdomain: {} - {}",
                self.fqdn(target_domain),
                self.status
            ),
        }
    }
}

/// 拼接候选标签与目标域名
pub fn scan_target(candidate: &str, target_domain: &str) -> String {
    format!("{}.{}", candidate, target_domain)
}

fn serialize_error<S>(error: &Option<ProbeError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_error() -> ProbeError {
        ProbeError::LookupFailure {
            host: "nope.example.com".to_string(),
            reason: "no record found".to_string(),
        }
    }

    #[test]
    fn test_method_present_only_on_success() {
        let ip: IpAddr = "93.184.216.34".parse().unwrap();
        let ok = [
            ValidationResult::dns_resolved("www", ip),
            ValidationResult::http_accessible("www"),
            ValidationResult::https_accessible("www"),
        ];
        for r in &ok {
            assert!(r.method.is_some());
            assert!(r.error.is_none());
            assert!(r.is_success());
        }

        let failed = ValidationResult::failed("nope", lookup_error());
        assert!(failed.method.is_none());
        assert!(failed.error.is_some());
        assert!(!failed.is_success());
        assert!(failed.is_failed());

        let pending = ValidationResult::not_validated("x");
        assert!(pending.method.is_none());
        assert!(!pending.is_success());
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(ValidationStatus::DnsResolved.to_string(), "DNS resolved");
        assert_eq!(ValidationStatus::HttpsAccessible.to_string(), "HTTPS accessible");
        assert_eq!(ValidationStatus::NotValidated.to_string(), "Not validated");
        assert_eq!(ValidationMethod::Https.to_string(), "HTTPS");
        assert_eq!(ValidationResult::failed("x", lookup_error()).method_display(), "none");
    }

    #[test]
    fn test_progress_line() {
        let ip: IpAddr = "93.184.216.34".parse().unwrap();
        assert_eq!(
            ValidationResult::dns_resolved("www", ip).progress_line("example.com"),
            "Found subdomain: www.example.com (93.184.216.34) - DNS resolved"
        );
        assert_eq!(
            ValidationResult::http_accessible("dev").progress_line("example.com"),
            "Found subdomain: dev.example.com - HTTP accessible"
        );
    }

    #[test]
    fn test_serialize_error_as_string() {
        let json = serde_json::to_value(ValidationResult::failed("nope", lookup_error())).unwrap();
        assert_eq!(json["status"], "Failed");
        assert_eq!(
            json["error"],
            "DNS lookup for nope.example.com failed: no record found"
        );
        assert!(json["ip"].is_null());
    }
}
