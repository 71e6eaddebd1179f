//! 参考点存储
//!
//! 只支持追加、全量读取、计数和整体清空，参考点不会被原地修改。

pub mod json_lines;
pub mod memory;
pub mod shared;

pub use json_lines::JsonLinesStore;
pub use memory::MemoryStore;
pub use shared::SharedStore;

use crate::error::StorageError;
use crate::fingerprint::ReferencePoint;

/// 参考点存储接口
pub trait ReferenceStore: Send {
    /// 追加一个参考点
    fn append(&mut self, point: ReferencePoint) -> Result<(), StorageError>;

    /// 批量追加
    ///
    /// 默认逐个调用 `append`，中途失败时已写入的参考点会保留；
    /// 需要整批成功或整批失败的实现应当覆盖此方法。
    fn append_batch(&mut self, points: &[ReferencePoint]) -> Result<(), StorageError> {
        for point in points {
            self.append(point.clone())?;
        }
        Ok(())
    }

    /// 返回所有参考点（顺序无语义）
    fn all(&self) -> Result<Vec<ReferencePoint>, StorageError>;

    /// 参考点数量，调用方据此分配下一个编号
    fn count(&self) -> Result<usize, StorageError>;

    /// 删除全部参考点，不可恢复
    fn clear(&mut self) -> Result<(), StorageError>;
}
