//! 无线信号测量数据结构

use serde::{Deserialize, Serialize};

/// 空槽位使用的接入点标识
pub const SENTINEL_IDENTIFIER: &str = "NA";

/// 表示"未观测到信号"的强度值 (dBm)
pub const SENTINEL_STRENGTH: i32 = -200;

/// 每个指纹保存的信号槽位数量
pub const FINGERPRINT_SLOTS: usize = 3;

/// 单个接入点的信号观测
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// 接入点硬件地址（BSSID / MAC），不是可变的显示名称
    pub identifier: String,
    /// 信号强度 (dBm)，越接近 0 越强
    pub strength: i32,
    /// 广播名称，仅用于诊断输出，不参与匹配
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SignalRecord {
    pub fn new(identifier: impl Into<String>, strength: i32) -> Self {
        SignalRecord {
            identifier: identifier.into(),
            strength,
            name: None,
        }
    }

    pub fn with_name(identifier: impl Into<String>, strength: i32, name: impl Into<String>) -> Self {
        SignalRecord {
            identifier: identifier.into(),
            strength,
            name: Some(name.into()),
        }
    }

    /// 空槽位 `("NA", -200)`
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_IDENTIFIER, SENTINEL_STRENGTH)
    }

    /// 是否为空槽位，只看标识；真实接入点即使强度为 -200 也不算空槽位
    pub fn is_sentinel(&self) -> bool {
        self.identifier == SENTINEL_IDENTIFIER
    }
}

/// 按信号强度从强到弱排序（强度相同保持原顺序）
pub fn rank_scan(mut scan: Vec<SignalRecord>) -> Vec<SignalRecord> {
    scan.sort_by(|a, b| b.strength.cmp(&a.strength));
    scan
}

/// 把扫描结果截断或补齐为固定 3 个槽位
pub fn fill_slots(scan: &[SignalRecord]) -> [SignalRecord; FINGERPRINT_SLOTS] {
    std::array::from_fn(|i| match scan.get(i) {
        Some(record) => SignalRecord::new(record.identifier.clone(), record.strength),
        None => SignalRecord::sentinel(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_scan() {
        let ranked = rank_scan(vec![
            SignalRecord::new("B", -70),
            SignalRecord::new("A", -40),
            SignalRecord::new("C", -70),
        ]);
        let ids: Vec<_> = ranked.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_fill_slots_pads_with_sentinel() {
        let slots = fill_slots(&[SignalRecord::with_name("A", -40, "office")]);
        assert_eq!(slots[0], SignalRecord::new("A", -40));
        assert_eq!(slots[1], SignalRecord::sentinel());
        assert_eq!(slots[2].strength, SENTINEL_STRENGTH);
    }

    #[test]
    fn test_fill_slots_truncates() {
        let scan: Vec<_> = (0..5).map(|i| SignalRecord::new(format!("AP{i}"), -40 - i)).collect();
        let slots = fill_slots(&scan);
        assert_eq!(slots[2].identifier, "AP2");
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(SignalRecord::sentinel().is_sentinel());
        assert!(!SignalRecord::new("A", SENTINEL_STRENGTH).is_sentinel());
        assert!(SignalRecord::new(SENTINEL_IDENTIFIER, -70).is_sentinel());
        assert!(!SignalRecord::new("A", -90).is_sentinel());
    }
}
