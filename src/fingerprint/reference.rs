//! 参考点（指纹）定义

use crate::fingerprint::signal::{FINGERPRINT_SLOTS, SignalRecord, fill_slots};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 经纬度坐标（由调用方校验范围）
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate { latitude, longitude }
    }

    /// 两点间线性插值，`t` 不做截断
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        Coordinate {
            latitude: (1.0 - t) * self.latitude + t * other.latitude,
            longitude: (1.0 - t) * self.longitude + t * other.longitude,
        }
    }
}

/// 参考点：某个物理位置及在该处观测到的最强 3 个接入点
///
/// 创建后不再修改。
#[derive(Clone, Debug, PartialEq)]
pub struct ReferencePoint {
    /// 插入时按存储计数分配的编号
    pub uid: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// 固定 3 个槽位，缺失槽位为 `("NA", -200)`
    pub signals: [SignalRecord; FINGERPRINT_SLOTS],
}

impl ReferencePoint {
    pub fn new(uid: u32, position: Coordinate, scan: &[SignalRecord]) -> Self {
        ReferencePoint {
            uid,
            latitude: position.latitude,
            longitude: position.longitude,
            signals: fill_slots(scan),
        }
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// 是否包含某个接入点
    pub fn observes(&self, identifier: &str) -> bool {
        self.signals
            .iter()
            .any(|slot| !slot.is_sentinel() && slot.identifier == identifier)
    }
}

/// 参考点库列表的展示格式：编号、`纬度 : 经度`，之后每个槽位一行 `标识 - 强度`
impl fmt::Display for ReferencePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{} : {}", self.uid, self.latitude, self.longitude)?;
        for slot in &self.signals {
            write!(f, "\n{} - {}", slot.identifier, slot.strength)?;
        }
        Ok(())
    }
}
