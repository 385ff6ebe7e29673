//! 线程安全的结果与进度管理模块
//!
//! `ScanState` 保存扫描结果，只暴露 `append` 和快照读取，
//! 调用方拿不到内部引用，因此遍历结果时不会与worker的写入竞争。
//!
//! 进度消息通过有界队列传递。队列满时发送方会等待消费者，
//! 消费者停滞会拖住整个扫描，这是预期的背压行为。

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tokio::sync::mpsc;

use crate::model::ValidationResult;

/// 进度队列默认容量
pub const DEFAULT_PROGRESS_CAPACITY: usize = 100;

/// 扫描结果存储
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    results: Arc<Mutex<Vec<ValidationResult>>>,
}

impl ScanState {
    /// 创建空的结果存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条结果，唯一的写操作
    pub fn append(&self, result: ValidationResult) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    /// 当前全部结果的拷贝（包含失败项），按完成顺序排列
    pub fn snapshot(&self) -> Vec<ValidationResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 仅成功结果的拷贝
    pub fn successes(&self) -> Vec<ValidationResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.is_success())
            .cloned()
            .collect()
    }

    /// 当前结果数量
    pub fn len(&self) -> usize {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// 是否还没有结果
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 创建一对进度发送端/接收端
pub fn progress_channel(capacity: usize) -> (ProgressSender, ProgressStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressSender { tx }, ProgressStream { rx })
}

/// 进度发送端，每个worker持有一份克隆
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<String>,
}

impl ProgressSender {
    /// 发送一条进度消息，队列满时等待
    ///
    /// 接收端已被丢弃时消息直接丢弃。
    pub async fn emit(&self, message: impl Into<String>) {
        if let Err(e) = self.tx.send(message.into()).await {
            debug!("进度接收端已关闭，丢弃消息: {}", e.0);
        }
    }
}

/// 进度消息流
///
/// 所有发送端被释放后（扫描结束并发出 "Scan completed" 之后）自动结束。
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::Receiver<String>,
}

impl ProgressStream {
    /// 等待下一条消息，流结束时返回 `None`
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// 在非异步上下文中阻塞读取，不能在tokio运行时线程里调用
    pub fn blocking_next(&mut self) -> Option<String> {
        self.rx.blocking_recv()
    }

    /// 读取直到流结束
    pub async fn collect_all(mut self) -> Vec<String> {
        let mut messages = Vec::new();
        while let Some(message) = self.next().await {
            messages.push(message);
        }
        messages
    }
}
