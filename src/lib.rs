//! # rsubscan
//!
//! 一个基于Rust实现的并发子域名扫描库。
//!
//! ## 特性
//!
//! - 🔍 **多方式校验**: 依次尝试 DNS → HTTP → HTTPS，任一成功即认为子域名存活
//! - 🧹 **泛解析过滤**: 扫描前用随机子域名探测泛解析，丢弃解析到泛解析IP的结果
//! - 🚀 **并发扫描**: 固定数量的worker消费预先填满的任务队列
//! - 📊 **进度流**: 扫描过程通过有界队列推送可读的进度消息
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use rsubscan::scan_subdomains;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let candidates = vec!["www".to_string(), "mail".to_string()];
//!     let results = scan_subdomains("example.com", candidates, 10).await?;
//!
//!     for result in results.iter().filter(|r| r.is_success()) {
//!         println!("  {} -> {}", result.fqdn("example.com"), result.status);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 监听进度
//!
//! ```rust,no_run
//! use rsubscan::{get_default_sub_data, ScanConfig, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scanner = Scanner::new("example.com", ScanConfig::default())?;
//!     let mut progress = scanner.progress().expect("progress stream");
//!     let printer = tokio::spawn(async move {
//!         while let Some(line) = progress.next().await {
//!             println!("{}", line);
//!         }
//!     });
//!
//!     scanner.run(get_default_sub_data(), 20).await?;
//!     printer.await?;
//!     println!("发现 {} 个子域名", scanner.successes().len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod logger;
pub mod error;
pub mod model;
pub mod dns_resolver;
pub mod verify;
pub mod wildcard;
pub mod validator;
pub mod state;
pub mod api;
pub mod subdata;
pub mod input;
pub mod output;

// 重新导出主要的公共API
pub use api::{scan_subdomains, ScanConfig, Scanner, SCAN_COMPLETED};

// 导出其他有用的类型
pub use error::{ProbeError, ScanError};
pub use model::{ValidationMethod, ValidationResult, ValidationStatus};
pub use dns_resolver::{DnsResolver, Resolve};
pub use verify::{DomainVerifier, Probe, Scheme};
pub use wildcard::{WildcardDetector, WildcardSignature};
pub use validator::Validator;
pub use state::{ProgressStream, ScanState};
pub use subdata::{get_default_sub_data, load_dictionary_from_file};
pub use output::export_results;
pub use input::{OutputFormat, parse_worker_count};
