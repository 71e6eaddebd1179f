//! 定位结果数据结构
//!
//! 包含室内定位输出的位置和误差信息

use crate::fingerprint::reference::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 一次室内定位结果
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionFix {
    /// 命中的参考点编号
    pub uid: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// 累计信号差 (dB)，用于表达置信程度，不是距离
    pub error_db: i32,
    /// 匹配得分
    pub score: f64,
    /// 使用的算法名称
    pub method: String,
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    pub fn new(uid: u32, position: Coordinate, error_db: i32, score: f64, method: String) -> Self {
        Self::with_timestamp(uid, position, error_db, score, method, Utc::now())
    }

    /// 创建具有自定义时间戳的结果
    pub fn with_timestamp(
        uid: u32,
        position: Coordinate,
        error_db: i32,
        score: f64,
        method: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        PositionFix {
            uid,
            latitude: position.latitude,
            longitude: position.longitude,
            error_db,
            score,
            method,
            timestamp,
        }
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// 面向用户的提示文本
    pub fn describe(&self) -> String {
        format!(
            "Reference point {} found with err ±{}dB",
            self.uid, self.error_db
        )
    }
}

impl fmt::Display for PositionFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} ({:.6}, {:.6}) ±{}dB [{}]",
            self.uid, self.latitude, self.longitude, self.error_db, self.method
        )
    }
}
