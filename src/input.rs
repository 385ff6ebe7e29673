//! 命令行参数与输入解析

use clap::Parser;
use regex::Regex;

/// 默认worker数量，线程数参数无法解析时同样使用它
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// 输出格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 制表符分隔的文本报告
    Txt,
    /// JSON
    Json,
    /// CSV
    Csv,
}

impl OutputFormat {
    /// 对应的文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("不支持的输出格式: {}。支持的格式: txt, json, csv", s)),
        }
    }
}

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "rsubscan")]
#[command(version)]
#[command(about = "Enumerate live subdomains via DNS, HTTP and HTTPS probing", long_about = None, arg_required_else_help = true)]
pub struct Opts {
    /// target domain, e.g. example.com
    #[arg(short, long)]
    pub domain: String,

    /// number of concurrent workers (5, 10, 20, 50, 100...)
    #[arg(short, long, default_value = "10")]
    pub threads: String,

    /// dictionary path, use the built-in list by default
    #[arg(short, long)]
    pub file: Option<String>,

    /// custom DNS servers, use the system configuration by default
    #[arg(short, long)]
    pub resolvers: Vec<String>,

    /// HTTP/HTTPS probe timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// show failed candidates too
    #[arg(short, long)]
    pub all: bool,

    /// output file path
    #[arg(short, long)]
    pub output: Option<String>,

    /// export to subdomain_results_<domain>_<time>.<ext>
    #[arg(long)]
    pub export: bool,

    /// output format (txt, json, csv)
    #[arg(long, default_value = "txt")]
    pub format: String,

    /// silent, do not print progress
    #[arg(short, long)]
    pub silent: bool,

    /// verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// 解析worker数量，无法解析或不为正数时使用默认值
pub fn parse_worker_count(threads: &str) -> usize {
    match threads.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => DEFAULT_WORKER_COUNT,
    }
}

/// 规范化目标域名：去掉协议、路径和末尾的点，并校验格式
pub fn normalize_domain(input: &str) -> Result<String, String> {
    let mut domain = input.trim().to_lowercase();
    for scheme in ["http://", "https://"] {
        if let Some(rest) = domain.strip_prefix(scheme) {
            domain = rest.to_string();
        }
    }
    if let Some(idx) = domain.find('/') {
        domain.truncate(idx);
    }
    let domain = domain.trim_end_matches('.').to_string();

    let re = Regex::new(r"^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9][a-z0-9-]{0,61}[a-z0-9]$")
        .map_err(|e| e.to_string())?;
    if re.is_match(&domain) {
        Ok(domain)
    } else {
        Err(format!("无效的域名: {}", input))
    }
}
