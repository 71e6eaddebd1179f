//! 内存参考点存储

use crate::error::StorageError;
use crate::fingerprint::ReferencePoint;
use crate::store::ReferenceStore;

/// 基于 `Vec` 的参考点存储，进程退出后数据丢失
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    points: Vec<ReferencePoint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有参考点创建
    pub fn from_vec(points: Vec<ReferencePoint>) -> Self {
        MemoryStore { points }
    }
}

impl ReferenceStore for MemoryStore {
    fn append(&mut self, point: ReferencePoint) -> Result<(), StorageError> {
        self.points.push(point);
        Ok(())
    }

    fn append_batch(&mut self, points: &[ReferencePoint]) -> Result<(), StorageError> {
        self.points.extend_from_slice(points);
        Ok(())
    }

    fn all(&self) -> Result<Vec<ReferencePoint>, StorageError> {
        Ok(self.points.clone())
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.points.len())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.points.clear();
        Ok(())
    }
}
