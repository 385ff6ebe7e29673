//! 扫描入口：配置、扫描器与worker池

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::Receiver;
use log::{debug, error, info};

use crate::dns_resolver::{DnsResolver, Resolve};
use crate::error::ScanError;
use crate::model::ValidationResult;
use crate::state::{progress_channel, ProgressSender, ProgressStream, ScanState, DEFAULT_PROGRESS_CAPACITY};
use crate::validator::Validator;
use crate::verify::{DomainVerifier, Probe, DEFAULT_PROBE_TIMEOUT};
use crate::wildcard::{WildcardDetector, WildcardSignature, DEFAULT_WILDCARD_PROBES};

/// 扫描完成时的最后一条进度消息
pub const SCAN_COMPLETED: &str = "Scan completed";

/// 扫描配置
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// DNS服务器列表，为空时使用系统配置
    pub resolvers: Vec<String>,
    /// HTTP/HTTPS探测超时
    pub probe_timeout: Duration,
    /// 泛解析检测的随机子域名数量
    pub wildcard_probes: usize,
    /// 进度队列容量
    pub progress_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            resolvers: Vec::new(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            wildcard_probes: DEFAULT_WILDCARD_PROBES,
            progress_capacity: DEFAULT_PROGRESS_CAPACITY,
        }
    }
}

/// 子域名扫描器
///
/// 每次扫描创建一个实例：持有目标域名、结果存储和进度流。
/// `run` 只能调用一次，结束后进度流自动关闭。
pub struct Scanner<R = DnsResolver, P = DomainVerifier> {
    target_domain: String,
    validator: Arc<Validator<R, P>>,
    detector: WildcardDetector<R>,
    state: ScanState,
    progress_tx: Mutex<Option<ProgressSender>>,
    progress_rx: Mutex<Option<ProgressStream>>,
}

impl Scanner {
    /// 使用真实的DNS解析器和HTTP客户端创建扫描器
    pub fn new(target_domain: &str, config: ScanConfig) -> Result<Self, ScanError> {
        let resolver = if config.resolvers.is_empty() {
            DnsResolver::new()
        } else {
            DnsResolver::with_nameservers(&config.resolvers)?
        };
        let verifier = DomainVerifier::new(config.probe_timeout)?;
        Ok(Self::with_probes(target_domain, resolver, verifier, &config))
    }
}

impl<R, P> Scanner<R, P>
where
    R: Resolve + 'static,
    P: Probe + 'static,
{
    /// 使用自定义的解析器和探测器创建扫描器
    pub fn with_probes(target_domain: &str, resolver: R, prober: P, config: &ScanConfig) -> Self {
        let resolver = Arc::new(resolver);
        let (tx, rx) = progress_channel(config.progress_capacity);

        Scanner {
            target_domain: target_domain.to_string(),
            validator: Arc::new(Validator::new(resolver.clone(), Arc::new(prober))),
            detector: WildcardDetector::new(resolver, config.wildcard_probes),
            state: ScanState::new(),
            progress_tx: Mutex::new(Some(tx)),
            progress_rx: Mutex::new(Some(rx)),
        }
    }

    /// 目标域名
    pub fn target_domain(&self) -> &str {
        &self.target_domain
    }

    /// 取出进度流，只能取一次，且必须在 `run` 之前取
    pub fn progress(&self) -> Option<ProgressStream> {
        self.progress_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// 全部结果（包含失败项）的快照
    pub fn snapshot(&self) -> Vec<ValidationResult> {
        self.state.snapshot()
    }

    /// 成功结果的快照
    pub fn successes(&self) -> Vec<ValidationResult> {
        self.state.successes()
    }

    /// 执行扫描
    ///
    /// 先检测泛解析，再启动 `worker_count` 个worker消费预先填满并关闭的队列，
    /// 所有worker退出后才返回。
    ///
    /// 无论成功还是因参数非法被拒绝，调用后扫描器都不能再次运行，进度流随之关闭。
    pub async fn run(&self, candidates: Vec<String>, worker_count: usize) -> Result<(), ScanError> {
        // 发送端先取出：参数非法时随之释放，已取走的进度流会立即结束
        let progress = self
            .progress_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ScanError::AlreadyStarted)?;
        if candidates.is_empty() {
            return Err(ScanError::EmptyCandidates);
        }
        if worker_count == 0 {
            return Err(ScanError::InvalidWorkerCount(worker_count));
        }
        // 没人取走的进度流在这里丢弃，否则队列写满后扫描会停住
        drop(self.progress());

        info!(
            "开始扫描 {}: {} 个候选子域名, {} 个worker",
            self.target_domain,
            candidates.len(),
            worker_count
        );

        // 泛解析检测必须在任何worker启动之前完成
        progress.emit("Checking for wildcard DNS...").await;
        let signature = self.detector.detect(&self.target_domain).await;
        if signature.has_wildcard() {
            progress
                .emit(format!("Wildcard DNS detected, IPs: {}", signature.describe()))
                .await;
        } else {
            progress.emit("No wildcard DNS detected").await;
        }
        let signature = Arc::new(signature);

        let (queue_tx, queue_rx) = crossbeam_channel::bounded(candidates.len());
        for candidate in candidates {
            // 容量等于候选数量，不会阻塞
            let _ = queue_tx.send(candidate);
        }
        drop(queue_tx);

        let target: Arc<str> = Arc::from(self.target_domain.as_str());
        let mut tasks = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let worker = Worker {
                queue: queue_rx.clone(),
                validator: self.validator.clone(),
                signature: signature.clone(),
                state: self.state.clone(),
                progress: progress.clone(),
                target_domain: target.clone(),
            };
            tasks.push(tokio::spawn(worker.run()));
        }
        drop(queue_rx);

        for task in tasks {
            if let Err(e) = task.await {
                error!("worker异常退出: {}", e);
            }
        }

        info!("{} 扫描结束, 共 {} 条结果", self.target_domain, self.state.len());
        progress.emit(SCAN_COMPLETED).await;
        Ok(())
    }
}

struct Worker<R, P> {
    queue: Receiver<String>,
    validator: Arc<Validator<R, P>>,
    signature: Arc<WildcardSignature>,
    state: ScanState,
    progress: ProgressSender,
    target_domain: Arc<str>,
}

impl<R: Resolve, P: Probe> Worker<R, P> {
    async fn run(self) {
        // 队列已预先填满并关闭，取空即退出
        while let Ok(candidate) = self.queue.try_recv() {
            let result = self.validator.validate(&candidate, &self.target_domain).await;

            if self.signature.filters(&result) {
                debug!("丢弃泛解析结果: {} ({})", candidate, result.ip_display());
                continue;
            }

            let message = (!result.is_failed()).then(|| result.progress_line(&self.target_domain));
            self.state.append(result);
            if let Some(message) = message {
                self.progress.emit(message).await;
            }
        }
    }
}

/// 便捷的扫描函数：使用默认配置扫描并返回全部结果
///
/// 进度消息会被丢弃。
pub async fn scan_subdomains(
    target_domain: &str,
    candidates: Vec<String>,
    worker_count: usize,
) -> Result<Vec<ValidationResult>, ScanError> {
    let scanner = Scanner::new(target_domain, ScanConfig::default())?;
    drop(scanner.progress());
    scanner.run(candidates, worker_count).await?;
    Ok(scanner.snapshot())
}
