//! 子域名字典

use std::fs;
use std::path::Path;

use crate::error::ScanError;

/// 内置的默认子域名字典
pub const DEFAULT_SUBDOMAINS: &[&str] = &[
    "www", "mail", "ftp", "localhost", "webmail", "smtp", "pop", "ns1", "webdisk", "ns2",
    "cpanel", "whm", "autodiscover", "autoconfig", "m", "imap", "test", "ns", "blog", "pop3",
    "dev", "www2", "admin", "forum", "news", "vpn", "ns3", "mail2", "new", "mysql",
    "old", "lists", "support", "mobile", "mx", "static", "docs", "beta", "shop", "sql",
    "secure", "demo", "cp", "calendar", "wiki", "web", "media", "email", "images", "img",
    "www1", "intranet", "portal", "video", "sip", "dns2", "api", "cdn", "stats", "dns1",
    "ns4", "www3", "dns", "search", "staging", "server", "mx1", "chat", "wap", "my",
    "svn", "mail1", "sites", "proxy", "ads", "host", "crm", "cms", "backup", "mx2",
    "lyncdiscover", "info", "apps", "download", "remote", "db", "forums", "store",
    "relay", "files", "newsletter", "app", "live", "owa", "en", "start", "sms",
    "office", "exchange", "ipv4",
];

/// 内置的默认子域名字典
pub fn get_default_sub_data() -> Vec<String> {
    DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect()
}

/// 解析字典内容：每行一个标签，去掉首尾空白，跳过空行
pub fn parse_dictionary(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 从文件加载字典，文件为空时返回错误
pub fn load_dictionary_from_file(path: impl AsRef<Path>) -> Result<Vec<String>, ScanError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ScanError::DictionaryLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let words = parse_dictionary(&content);
    if words.is_empty() {
        return Err(ScanError::EmptyDictionary(path.to_path_buf()));
    }
    Ok(words)
}
