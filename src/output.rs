//! 扫描结果导出（TXT/JSON/CSV）

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;
use serde::Serialize;

use crate::error::ScanError;
use crate::input::OutputFormat;
use crate::model::ValidationResult;

/// 可序列化的单条结果
#[derive(Debug, Clone, Serialize)]
pub struct SerializableResult {
    /// 完整域名
    pub domain: String,
    /// 子域名标签
    pub subdomain: String,
    /// IP地址，未解析时为空
    pub ip: String,
    /// 状态描述
    pub status: String,
    /// 探测方式
    pub method: String,
    /// 失败原因
    pub error: Option<String>,
}

/// 完整的导出数据结构
#[derive(Debug, Clone, Serialize)]
pub struct ExportData {
    /// 目标域名
    pub target_domain: String,
    /// 导出时间
    pub export_time: String,
    /// 结果数量
    pub total: usize,
    /// 结果列表
    pub results: Vec<SerializableResult>,
}

impl SerializableResult {
    fn from_result(result: &ValidationResult, target_domain: &str) -> Self {
        SerializableResult {
            domain: result.fqdn(target_domain),
            subdomain: result.subdomain.clone(),
            ip: result.ip_display(),
            status: result.status.to_string(),
            method: result.method_display(),
            error: result.error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// 默认导出文件名：subdomain_results_<domain>_<YYYYmmdd_HHMMSS>.<ext>
pub fn default_export_path(target_domain: &str, format: OutputFormat, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "subdomain_results_{}_{}.{}",
        target_domain,
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// 导出扫描结果
///
/// `include_failed` 为 false 时只导出成功的结果。
pub fn export_results(
    results: &[ValidationResult],
    target_domain: &str,
    output_path: impl AsRef<Path>,
    format: OutputFormat,
    include_failed: bool,
) -> Result<(), ScanError> {
    let path = output_path.as_ref();
    let now = Local::now();
    let selected: Vec<&ValidationResult> = results
        .iter()
        .filter(|r| include_failed || r.is_success())
        .collect();

    let content = match format {
        OutputFormat::Txt => render_txt(&selected, target_domain, now),
        OutputFormat::Json => render_json(&selected, target_domain, now)?,
        OutputFormat::Csv => render_csv(&selected, target_domain),
    };

    let export_error = |source: std::io::Error| ScanError::Export {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(export_error)?;
    file.write_all(content.as_bytes()).map_err(export_error)?;

    info!("结果已导出到: {}", path.display());
    Ok(())
}

/// 导出为TXT格式
fn render_txt(results: &[&ValidationResult], target_domain: &str, now: DateTime<Local>) -> String {
    let mut txt = String::new();
    txt.push_str(&format!("Subdomain Scan Results - {}\n", target_domain));
    txt.push_str(&format!("Scan Time: {}\n", now.format("%Y-%m-%d %H:%M:%S")));
    txt.push_str(&format!("{}\n", "=".repeat(50)));
    txt.push_str("Subdomain\tIP Address\tStatus\tMethod\n");

    for result in results {
        txt.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            result.fqdn(target_domain),
            result.ip_display(),
            result.status,
            result.method_display()
        ));
    }
    txt
}

/// 导出为JSON格式
fn render_json(
    results: &[&ValidationResult],
    target_domain: &str,
    now: DateTime<Local>,
) -> Result<String, ScanError> {
    let data = ExportData {
        target_domain: target_domain.to_string(),
        export_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        total: results.len(),
        results: results
            .iter()
            .map(|r| SerializableResult::from_result(r, target_domain))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// 导出为CSV格式
fn render_csv(results: &[&ValidationResult], target_domain: &str) -> String {
    let mut csv = String::from("Domain,IP,Status,Method,Error\n");
    for result in results {
        let row = SerializableResult::from_result(result, target_domain);
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            escape_csv(&row.domain),
            escape_csv(&row.ip),
            escape_csv(&row.status),
            escape_csv(&row.method),
            escape_csv(row.error.as_deref().unwrap_or(""))
        ));
    }
    csv
}

/// CSV转义
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use chrono::TimeZone;

    fn sample() -> Vec<ValidationResult> {
        vec![
            ValidationResult::dns_resolved("www", "93.184.216.34".parse().unwrap()),
            ValidationResult::https_accessible("secure"),
            ValidationResult::failed(
                "nope",
                ProbeError::LookupFailure {
                    host: "nope.example.com".to_string(),
                    reason: "no record, really".to_string(),
                },
            ),
        ]
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_default_export_path() {
        let path = default_export_path("example.com", OutputFormat::Txt, fixed_time());
        assert_eq!(
            path,
            PathBuf::from("subdomain_results_example.com_20240301_093005.txt")
        );
    }

    #[test]
    fn test_render_txt_success_only() {
        let results = sample();
        let selected: Vec<&ValidationResult> = results.iter().filter(|r| r.is_success()).collect();
        let txt = render_txt(&selected, "example.com", fixed_time());
        let lines: Vec<&str> = txt.lines().collect();

        assert_eq!(lines[0], "Subdomain Scan Results - example.com");
        assert_eq!(lines[1], "Scan Time: 2024-03-01 09:30:05");
        assert_eq!(lines[2], "=".repeat(50));
        assert_eq!(lines[3], "Subdomain\tIP Address\tStatus\tMethod");
        assert_eq!(lines[4], "www.example.com\t93.184.216.34\tDNS resolved\tDNS");
        assert_eq!(lines[5], "secure.example.com\t\tHTTPS accessible\tHTTPS");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_render_json() {
        let results = sample();
        let selected: Vec<&ValidationResult> = results.iter().collect();
        let json = render_json(&selected, "example.com", fixed_time()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["target_domain"], "example.com");
        assert_eq!(value["total"], 3);
        assert_eq!(value["results"][0]["domain"], "www.example.com");
        assert_eq!(value["results"][2]["status"], "Failed");
        assert_eq!(value["results"][2]["method"], "none");
    }

    #[test]
    fn test_render_csv_escapes() {
        let results = sample();
        let selected: Vec<&ValidationResult> = results.iter().collect();
        let csv = render_csv(&selected, "example.com");
        assert!(csv.starts_with("Domain,IP,Status,Method,Error\n"));
        assert!(csv.contains("\"DNS lookup for nope.example.com failed: no record, really\""));
    }

    #[test]
    fn test_export_results_writes_file() {
        let path = std::env::temp_dir().join(format!("rsubscan_export_{}.txt", std::process::id()));
        export_results(&sample(), "example.com", &path, OutputFormat::Txt, false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("www.example.com"));
        assert!(!content.contains("nope.example.com"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let err = export_results(
            &sample(),
            "example.com",
            "/nonexistent/rsubscan/out.txt",
            OutputFormat::Txt,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::Export { .. }));
    }
}
