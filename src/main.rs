use std::process;
use std::time::Duration;

use clap::Parser;
use colored::*;
use log::LevelFilter;

use rsubscan::input::{normalize_domain, parse_worker_count, Opts, OutputFormat};
use rsubscan::logger::init_logger;
use rsubscan::output::{default_export_path, export_results};
use rsubscan::subdata::{get_default_sub_data, load_dictionary_from_file};
use rsubscan::{ScanConfig, ScanError, Scanner, ValidationResult, SCAN_COMPLETED};

#[tokio::main]
async fn main() {
    let opts = Opts::parse();

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = init_logger(level) {
        eprintln!("日志初始化失败: {}", e);
    }

    if let Err(e) = run(opts).await {
        eprintln!("{} {}", "扫描失败:".red(), e);
        process::exit(1);
    }
}

async fn run(opts: Opts) -> Result<(), Box<dyn std::error::Error>> {
    let domain = normalize_domain(&opts.domain)?;
    let workers = parse_worker_count(&opts.threads);
    let format = opts.format.parse::<OutputFormat>().unwrap_or_else(|e| {
        eprintln!("{}, 使用默认TXT格式", e);
        OutputFormat::Txt
    });

    let candidates = match &opts.file {
        Some(path) => load_dictionary_from_file(path)?,
        None => get_default_sub_data(),
    };
    if candidates.is_empty() {
        return Err(ScanError::EmptyCandidates.into());
    }

    println!("目标域名: {}", domain);
    println!("加载 {} 个子域名, {} 个worker", candidates.len(), workers);

    let config = ScanConfig {
        resolvers: opts.resolvers.clone(),
        probe_timeout: Duration::from_secs(opts.timeout.max(1)),
        ..Default::default()
    };
    let scanner = Scanner::new(&domain, config)?;

    // 进度必须持续消费，否则队列写满后扫描会停住
    let mut progress = scanner.progress().ok_or(ScanError::AlreadyStarted)?;
    let silent = opts.silent;
    let printer = tokio::spawn(async move {
        while let Some(line) = progress.next().await {
            if silent {
                continue;
            }
            if line.starts_with("Found subdomain") {
                println!("{} {}", "[+]".green(), line);
            } else if line == SCAN_COMPLETED {
                println!("{}", line.bold());
            } else {
                println!("{} {}", "[*]".blue(), line);
            }
        }
    });

    scanner.run(candidates, workers).await?;
    printer.await?;

    let results = if opts.all {
        scanner.snapshot()
    } else {
        scanner.successes()
    };
    print_results(&domain, &results, opts.all);

    let output_path = match (&opts.output, opts.export) {
        (Some(path), _) => Some(path.into()),
        (None, true) => Some(default_export_path(&domain, format, chrono::Local::now())),
        (None, false) => None,
    };
    if let Some(path) = output_path {
        export_results(&scanner.snapshot(), &domain, &path, format, opts.all)?;
        println!("结果已导出到: {}", path.display());
    }

    Ok(())
}

fn print_results(domain: &str, results: &[ValidationResult], show_all: bool) {
    let found = results.iter().filter(|r| r.is_success()).count();
    println!("\nScan completed! Found {} valid subdomains:", found);

    for result in results {
        let line = format!(
            "  {:<35} {:<40} {:<18} [{}]",
            result.fqdn(domain),
            result.ip_display(),
            result.status.to_string(),
            result.method_display()
        );
        if result.is_success() {
            println!("{}", line.green());
        } else if show_all {
            println!("{}", line.dimmed());
        }
    }
}
