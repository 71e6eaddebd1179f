//! 训练参考点生成
//!
//! 用户以近似匀速从起点走到终点，期间周期性扫描；
//! 根据每次扫描在整个行程中的相对时间，在起终点之间线性插值出位置。

use crate::error::{PositioningError, Result};
use crate::fingerprint::reference::{Coordinate, ReferencePoint};
use crate::fingerprint::signal::SignalRecord;
use tracing::debug;

/// 一次训练扫描
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReading {
    /// 距会话开始的毫秒数
    pub relative_time_ms: u64,
    /// 该时刻的原始扫描（按强度从强到弱）
    pub scan: Vec<SignalRecord>,
}

impl TrainingReading {
    pub fn new(relative_time_ms: u64, scan: Vec<SignalRecord>) -> Self {
        TrainingReading {
            relative_time_ms,
            scan,
        }
    }
}

/// 把一次训练会话的扫描转换为参考点
///
/// # 参数
/// - `start` / `end`: 路径起终点
/// - `readings`: 按采集顺序排列的扫描
/// - `total_elapsed_ms`: 会话总耗时，必须大于 0
/// - `first_uid`: 第一个参考点的编号（通常为存储当前计数）
///
/// # 返回
/// - 与输入顺序一致的参考点，编号依次递增
pub fn finalize_session(
    start: Coordinate,
    end: Coordinate,
    readings: &[TrainingReading],
    total_elapsed_ms: u64,
    first_uid: u32,
) -> Result<Vec<ReferencePoint>> {
    if total_elapsed_ms == 0 {
        return Err(PositioningError::InvalidSession(
            "会话总耗时为 0，无法计算相对时间".to_string(),
        ));
    }

    let total = total_elapsed_ms as f64;
    let points: Vec<ReferencePoint> = readings
        .iter()
        .zip(first_uid..)
        .map(|(reading, uid)| {
            let relative_time = reading.relative_time_ms as f64 / total;
            let position = start.lerp(&end, relative_time);
            ReferencePoint::new(uid, position, &reading.scan)
        })
        .collect();

    debug!(
        readings = readings.len(),
        first_uid,
        total_elapsed_ms,
        "训练会话已转换为参考点"
    );
    Ok(points)
}
