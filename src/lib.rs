//! 室内指纹定位引擎
//!
//! 支持的功能：
//! - 实时信号扫描与参考点（指纹）匹配
//! - 沿已知路径行走时自动生成训练参考点
//! - 参考点持久化（内存 / JSON 行文件）
//! - 蓝牙扫描适配与扫描缓存

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod pending;
pub mod positioning;
pub mod scanner;
pub mod store;

pub use config::NavConfig;
pub use error::{PositioningError, StorageError};
pub use fingerprint::*;
pub use positioning::IndoorPositioner;
pub use store::{JsonLinesStore, MemoryStore, ReferenceStore, SharedStore};
