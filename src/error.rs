//! 定位引擎错误类型

use std::io;
use thiserror::Error;

/// 参考点存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 底层文件不可用或读写失败
    #[error("参考点存储 I/O 失败: {0}")]
    Io(#[from] io::Error),

    /// 存储文件中某一行无法解析
    #[error("参考点存储第 {line} 行损坏: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },

    /// 参考点序列化失败
    #[error("参考点编码失败: {0}")]
    Encode(serde_json::Error),
}

/// 定位与训练过程中的错误
#[derive(Debug, Error)]
pub enum PositioningError {
    /// 没有可用的参考点，或实时扫描与任何参考点都没有重叠
    #[error("未找到匹配的参考点")]
    NoMatch,

    /// 参考点库为空
    #[error("参考点库为空")]
    EmptyStore,

    /// 训练会话参数非法（耗时为 0、路径未设置等）
    #[error("训练会话无效: {0}")]
    InvalidSession(String),

    /// 存储层错误，原样向上传递
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// 扫描后端失败
    #[error("信号扫描失败: {0}")]
    Scan(String),

    /// 配置无效
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// 异步操作在完成前被丢弃
    #[error("异步操作已取消")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, PositioningError>;
