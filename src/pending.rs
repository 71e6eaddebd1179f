//! 异步请求/响应边界
//!
//! 扫描和存储访问在后台任务中执行，调用方拿到一个 [`Pending`]，
//! 可以等待完成通知，也可以非阻塞地查询结果。

use crate::error::{PositioningError, Result};
use std::future::Future;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// 尚未完成的操作
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T: Send + 'static> Pending<T> {
    /// 在 tokio 运行时中启动操作
    pub fn spawn<F>(operation: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            // 接收方已放弃等待时结果直接丢弃
            let _ = tx.send(operation.await);
        });
        Pending { rx }
    }

    /// 已经完成的操作
    pub fn ready(value: T) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(value);
        Pending { rx }
    }

    /// 等待完成通知
    pub async fn wait(self) -> Result<T> {
        self.rx.await.map_err(|_| PositioningError::Cancelled)
    }

    /// 非阻塞查询，尚未完成时返回 None
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(value) => Some(Ok(value)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(PositioningError::Cancelled)),
        }
    }
}

impl<T: Send + 'static> Pending<Result<T>> {
    /// 等待完成并展开操作自身的错误
    pub async fn resolve(self) -> Result<T> {
        self.wait().await?
    }
}
