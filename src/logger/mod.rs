//! 带颜色的终端日志

use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::sync::Mutex;

/// 终端日志：带颜色的级别标签，输出到 stderr
///
/// 进度消息走 stdout，日志不会和它们混在一起。
pub struct Logger {
    use_colors: bool,
    max_level: LevelFilter,
    mutex: Mutex<()>,
}

impl Logger {
    /// 创建日志器，默认带颜色
    pub fn new(max_level: LevelFilter) -> Self {
        Logger {
            use_colors: true,
            max_level,
            mutex: Mutex::new(()),
        }
    }

    /// 关闭颜色输出
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(level: Level) -> &'static str {
        match level {
            Level::Error => "Error",
            Level::Warn => "Warning",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    fn wrap(&self, level: Level) -> String {
        let label = Self::label(level);
        if !self.use_colors {
            return label.to_string();
        }

        match level {
            Level::Error => label.red().to_string(),
            Level::Warn => label.yellow().to_string(),
            Level::Info => label.blue().to_string(),
            Level::Debug => label.magenta().to_string(),
            Level::Trace => label.normal().to_string(),
        }
    }

    /// 格式化为 `[级别] 消息`
    pub fn format(&self, record: &Record) -> String {
        format!("[{}] {}", self.wrap(record.level()), record.args())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format(record);
        let _guard = self.mutex.lock();
        let _ = writeln!(std::io::stderr(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// 安装全局日志，只能调用一次
pub fn init_logger(max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(Logger::new(max_level)))?;
    log::set_max_level(max_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_without_colors() {
        let logger = Logger::new(LevelFilter::Info).without_colors();
        let line = logger.format(
            &Record::builder()
                .args(format_args!("scan started"))
                .level(Level::Warn)
                .build(),
        );
        assert_eq!(line, "[Warning] scan started");
    }

    #[test]
    fn test_init_logger_installs_once() {
        let _ = init_logger(LevelFilter::Info);
        assert!(init_logger(LevelFilter::Debug).is_err());
        assert!(log::logger().enabled(&Metadata::builder().level(Level::Error).build()));
    }

    #[test]
    fn test_level_filter() {
        let logger = Logger::new(LevelFilter::Info);
        let debug = Metadata::builder().level(Level::Debug).build();
        let error = Metadata::builder().level(Level::Error).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&error));
    }
}
