//! 线程安全的参考点存储包装
//!
//! 所有访问都经过同一把异步锁：
//! - 匹配读取的是完整快照，不会看到写了一半的参考点
//! - 批量插入在一次加锁内完成"计数 → 分配编号 → 追加"，并发会话不会得到重复编号

use crate::error::{PositioningError, StorageError};
use crate::fingerprint::ReferencePoint;
use crate::store::ReferenceStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub struct SharedStore<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        SharedStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ReferenceStore> SharedStore<S> {
    pub fn new(store: S) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// 读取全部参考点的一致快照
    pub async fn snapshot(&self) -> Result<Vec<ReferencePoint>, StorageError> {
        let store = self.inner.lock().await;
        store.all()
    }

    pub async fn count(&self) -> Result<usize, StorageError> {
        let store = self.inner.lock().await;
        store.count()
    }

    /// 串行化的批量插入
    ///
    /// `build` 收到当前计数作为第一个编号，返回要追加的参考点；
    /// 整个过程持有存储锁。
    pub async fn insert_batch<F>(&self, build: F) -> Result<Vec<ReferencePoint>, PositioningError>
    where
        F: FnOnce(u32) -> Result<Vec<ReferencePoint>, PositioningError>,
    {
        let mut store = self.inner.lock().await;
        let count = store.count()?;
        let first_uid = u32::try_from(count).map_err(|_| {
            PositioningError::InvalidSession(format!("参考点数量 {} 超出编号范围", count))
        })?;

        let points = build(first_uid)?;
        store.append_batch(&points)?;

        info!(first_uid, inserted = points.len(), "参考点批量写入完成");
        Ok(points)
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        let mut store = self.inner.lock().await;
        store.clear()
    }
}
