//! 错误类型
//!
//! `ProbeError` 描述单个候选子域名在探测链上的失败，会被保存在结果里；
//! `ScanError` 描述调用层面的失败（前置条件、字典加载、导出等）。

use std::path::PathBuf;
use thiserror::Error;

/// 单次探测失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// DNS解析失败或没有返回任何地址
    #[error("DNS lookup for {host} failed: {reason}")]
    LookupFailure {
        /// 被解析的完整域名
        host: String,
        /// 解析器给出的原因
        reason: String,
    },

    /// HTTP/HTTPS请求失败（连接错误、超时、TLS错误等）
    #[error("request to {url} failed: {reason}")]
    ProbeFailure {
        /// 请求的URL
        url: String,
        /// 底层错误描述
        reason: String,
    },

    /// 请求成功但状态码不在接受范围内
    #[error("request to {url} returned unexpected status {status}")]
    UnexpectedStatus {
        /// 请求的URL
        url: String,
        /// 最终响应的状态码
        status: u16,
    },
}

/// 扫描层面的错误
#[derive(Debug, Error)]
pub enum ScanError {
    /// 候选列表为空
    #[error("no candidate subdomains to scan")]
    EmptyCandidates,

    /// worker数量为0
    #[error("worker count must be positive, got {0}")]
    InvalidWorkerCount(usize),

    /// 扫描器已经运行过
    #[error("scanner has already been started")]
    AlreadyStarted,

    /// 自定义DNS服务器地址无法解析
    #[error("invalid resolver address: {0}")]
    InvalidResolver(String),

    /// HTTP客户端创建失败
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// 字典文件读取失败
    #[error("failed to load dictionary {path:?}: {source}")]
    DictionaryLoad {
        /// 字典文件路径
        path: PathBuf,
        /// IO错误
        #[source]
        source: std::io::Error,
    },

    /// 字典文件中没有有效子域名
    #[error("dictionary {0:?} contains no subdomains")]
    EmptyDictionary(PathBuf),

    /// 导出文件写入失败
    #[error("failed to export results to {path:?}: {source}")]
    Export {
        /// 导出文件路径
        path: PathBuf,
        /// IO错误
        #[source]
        source: std::io::Error,
    },

    /// JSON序列化失败
    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}
