//! HTTP/HTTPS可达性探测

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, ClientBuilder};

use crate::error::{ProbeError, ScanError};

/// 所有探测请求使用的固定浏览器UA
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36 Edg/134.0.0.0";

/// 默认请求超时
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// 视为"可访问"的状态码
pub const SUCCESS_CODES: [u16; 4] = [200, 403, 301, 302];

/// 探测使用的协议
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// 明文 `http://`
    Http,
    /// `https://`，不校验证书
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// 单次HTTP/HTTPS可达性探测
#[async_trait]
pub trait Probe: Send + Sync {
    /// 对 `scheme://host` 发起探测，状态码在 [`SUCCESS_CODES`] 中时返回该状态码
    async fn probe(&self, scheme: Scheme, host: &str) -> Result<u16, ProbeError>;
}

/// 状态码是否视为可访问
pub fn is_success_code(status: u16) -> bool {
    SUCCESS_CODES.contains(&status)
}

/// 域名验证器
///
/// 内部只有一个 `reqwest::Client`，所有worker共享连接池。
/// 证书校验被关闭，自签名或配置错误的站点同样视为可达。
/// 重定向按 reqwest 默认策略跟随，以最终响应的状态码为准；不使用系统代理。
#[derive(Clone)]
pub struct DomainVerifier {
    client: Client,
}

impl DomainVerifier {
    /// 创建验证器，`timeout` 作用于每个请求（含重定向）
    pub fn new(timeout: Duration) -> Result<Self, ScanError> {
        let client = client_builder(timeout).build()?;
        Ok(DomainVerifier { client })
    }
}

fn client_builder(timeout: Duration) -> ClientBuilder {
    Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(true)
        .no_proxy()
        .user_agent(BROWSER_USER_AGENT)
}

#[async_trait]
impl Probe for DomainVerifier {
    async fn probe(&self, scheme: Scheme, host: &str) -> Result<u16, ProbeError> {
        let url = format!("{}://{}", scheme, host);
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| ProbeError::ProbeFailure {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if is_success_code(status) {
            Ok(status)
        } else {
            debug!("{} 返回状态码 {}", url, status);
            Err(ProbeError::UnexpectedStatus { url, status })
        }
    }
}
