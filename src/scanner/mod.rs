//! 信号扫描来源
//!
//! - [`BleScanner`]: 基于 btleplug 的蓝牙扫描
//! - [`ScanCache`]: 带过期清理的最新观测缓存
//! - [`ReplayScanner`]: 回放预先录制的扫描，用于离线会话和测试

pub mod ble;
pub mod cache;
pub mod replay;

pub use ble::BleScanner;
pub use cache::ScanCache;
pub use replay::ReplayScanner;

use crate::error::Result;
use crate::fingerprint::SignalRecord;
use std::future::Future;

/// 扫描接口
///
/// 返回按强度从强到弱排列的观测，可以为空。
pub trait Scanner: Send + Sync + 'static {
    fn scan(&self) -> impl Future<Output = Result<Vec<SignalRecord>>> + Send;
}
