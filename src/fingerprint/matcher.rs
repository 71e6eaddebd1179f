//! 指纹匹配算法
//!
//! 按实时扫描中接入点的强度排名加权，在参考点库中寻找最相似的指纹：
//! - 排名第 1/2/3 的接入点权重默认为 1.0 / 0.6 / 0.3
//! - 每个标识相同的存储槽位贡献 `权重 * (100 - |强度差|)`
//! - 得分严格最高者胜出，得分相同保留先出现的参考点

use crate::fingerprint::reference::ReferencePoint;
use crate::fingerprint::results::PositionFix;
use crate::fingerprint::signal::{FINGERPRINT_SLOTS, SignalRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// 匹配算法名称
pub const METHOD_WEIGHTED_FINGERPRINT: &str = "fingerprint_weighted";

/// 默认排名权重
pub const DEFAULT_RANK_WEIGHTS: [f64; FINGERPRINT_SLOTS] = [1.0, 0.6, 0.3];

/// 匹配参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// 实时扫描第 1/2/3 强接入点的权重
    pub weights: [f64; FINGERPRINT_SLOTS],
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            weights: DEFAULT_RANK_WEIGHTS,
        }
    }
}

/// 匹配结果
#[derive(Clone, Debug, PartialEq)]
pub struct MatchOutcome<'a> {
    /// 最佳参考点，没有任何重叠时为 None
    pub best: Option<&'a ReferencePoint>,
    pub score: f64,
    /// 最佳参考点的累计信号差 (dB)
    pub error_estimate: i32,
}

impl<'a> MatchOutcome<'a> {
    /// `(None, 0)`
    pub fn none() -> Self {
        MatchOutcome {
            best: None,
            score: 0.0,
            error_estimate: 0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.best.is_some()
    }

    /// 转换为面向调用方的定位结果
    pub fn to_fix(&self) -> Option<PositionFix> {
        self.best.map(|point| {
            PositionFix::new(
                point.uid,
                point.position(),
                self.error_estimate,
                self.score,
                METHOD_WEIGHTED_FINGERPRINT.to_string(),
            )
        })
    }
}

/// 加权最近邻指纹匹配器
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Matcher { config }
    }

    /// 在参考点中寻找与实时扫描最相似的一个
    ///
    /// # 参数
    /// - `live_scan`: 按强度从强到弱排列的实时扫描，只使用前 3 条
    /// - `reference_points`: 参考点快照，顺序决定平分时的胜者
    ///
    /// # 返回
    /// - 没有参考点或与任何参考点都没有相同接入点时返回 `(None, 0)`
    pub fn find_match<'a>(
        &self,
        live_scan: &[SignalRecord],
        reference_points: &'a [ReferencePoint],
    ) -> MatchOutcome<'a> {
        let live: Vec<(usize, &SignalRecord)> = live_scan
            .iter()
            .take(FINGERPRINT_SLOTS)
            .enumerate()
            .filter(|(_, record)| !record.is_sentinel())
            .collect();

        let mut outcome = MatchOutcome::none();
        if live.is_empty() {
            debug!("实时扫描没有可用接入点，跳过匹配");
            return outcome;
        }

        for point in reference_points {
            let Some((score, error)) = self.score_point(&live, point) else {
                continue;
            };
            trace!(uid = point.uid, score, error, "参考点得分");

            if outcome.best.is_none() || score > outcome.score {
                outcome = MatchOutcome {
                    best: Some(point),
                    score,
                    error_estimate: error,
                };
            }
        }

        match outcome.best {
            Some(point) => debug!(
                uid = point.uid,
                score = outcome.score,
                error = outcome.error_estimate,
                candidates = reference_points.len(),
                "找到最佳参考点"
            ),
            None => debug!(candidates = reference_points.len(), "没有参考点与实时扫描重叠"),
        }
        outcome
    }

    /// 计算单个参考点的得分与误差，没有任何相同接入点时返回 None
    fn score_point(
        &self,
        live: &[(usize, &SignalRecord)],
        point: &ReferencePoint,
    ) -> Option<(f64, i32)> {
        let mut matched = false;
        let mut score = 0.0;
        let mut error = 0;

        for &(rank, record) in live {
            let weight = self.config.weights[rank];
            // 同一实时槽位命中多个存储槽位时都计分，误差取最后一个命中的差值
            let mut difference = 0;
            for slot in &point.signals {
                if slot.identifier == record.identifier {
                    difference = (slot.strength - record.strength).abs();
                    score += weight * f64::from(100 - difference);
                    matched = true;
                }
            }
            error += difference;
        }

        matched.then_some((score, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::reference::Coordinate;

    fn point(uid: u32, signals: &[(&str, i32)]) -> ReferencePoint {
        let scan: Vec<_> = signals
            .iter()
            .map(|(id, dbm)| SignalRecord::new(*id, *dbm))
            .collect();
        ReferencePoint::new(uid, Coordinate::new(uid as f64, -(uid as f64)), &scan)
    }

    fn scan(signals: &[(&str, i32)]) -> Vec<SignalRecord> {
        signals
            .iter()
            .map(|(id, dbm)| SignalRecord::new(*id, *dbm))
            .collect()
    }

    #[test]
    fn test_single_point_example() {
        let points = vec![ReferencePoint::new(
            0,
            Coordinate::new(55.92, -3.17),
            &scan(&[("A", -40), ("B", -60)]),
        )];
        let outcome = Matcher::default().find_match(&scan(&[("A", -42), ("C", -70)]), &points);

        assert_eq!(outcome.best.map(|p| p.uid), Some(0));
        assert_eq!(outcome.score, 98.0);
        assert_eq!(outcome.error_estimate, 2);
    }

    #[test]
    fn test_no_overlap_is_no_match() {
        let points = vec![point(0, &[("A", -40)]), point(1, &[("B", -50)])];
        let outcome = Matcher::default().find_match(&scan(&[("X", -40), ("Y", -50)]), &points);
        assert_eq!(outcome, MatchOutcome::none());
    }

    #[test]
    fn test_empty_inputs() {
        let matcher = Matcher::default();
        assert!(!matcher.find_match(&scan(&[("A", -40)]), &[]).is_match());
        assert!(!matcher.find_match(&[], &[point(0, &[("A", -40)])]).is_match());
    }

    #[test]
    fn test_sentinel_live_slots_are_skipped() {
        let points = vec![point(0, &[("A", -40)])];
        let live = vec![SignalRecord::sentinel(), SignalRecord::new("NA", -55)];
        assert!(!Matcher::default().find_match(&live, &points).is_match());
    }

    #[test]
    fn test_real_access_point_at_floor_strength_is_scored() {
        let points = vec![point(0, &[("A", -40)])];
        let live = vec![SignalRecord::sentinel(), SignalRecord::new("A", -200)];
        let outcome = Matcher::default().find_match(&live, &points);

        // 排名第二：0.6 * (100 - 160)
        assert_eq!(outcome.best.map(|p| p.uid), Some(0));
        assert!((outcome.score + 36.0).abs() < 1e-9);
        assert_eq!(outcome.error_estimate, 160);
    }

    #[test]
    fn test_rank_weights_applied() {
        let points = vec![
            point(0, &[("A", -40)]),
            point(1, &[("B", -50)]),
            point(2, &[("C", -60)]),
        ];
        let matcher = Matcher::default();
        let live = scan(&[("C", -60), ("B", -50), ("A", -40)]);
        let outcome = matcher.find_match(&live, &points);
        assert_eq!(outcome.best.map(|p| p.uid), Some(2));
        assert_eq!(outcome.score, 100.0);

        // 只看第三名接入点时得分为 0.3 * 100
        let outcome = matcher.find_match(&live, &points[..1]);
        assert!((outcome.score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_stored_slots_all_contribute() {
        let points = vec![point(0, &[("A", -40), ("A", -50), ("B", -70)])];
        let outcome = Matcher::default().find_match(&scan(&[("A", -45)]), &points);
        assert_eq!(outcome.score, 95.0 + 95.0);
        // 误差取最后一个命中槽位的差值
        assert_eq!(outcome.error_estimate, 5);
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let points = vec![point(4, &[("A", -40)]), point(9, &[("A", -40)])];
        let outcome = Matcher::default().find_match(&scan(&[("A", -40)]), &points);
        assert_eq!(outcome.best.map(|p| p.uid), Some(4));
    }

    #[test]
    fn test_only_top_three_live_records_used() {
        let points = vec![point(0, &[("D", -80)])];
        let live = scan(&[("A", -40), ("B", -50), ("C", -60), ("D", -80)]);
        assert!(!Matcher::default().find_match(&live, &points).is_match());
    }

    #[test]
    fn test_negative_scores_still_selected() {
        let points = vec![point(0, &[("A", -30)])];
        let outcome = Matcher::default().find_match(&scan(&[("A", -190)]), &points);
        assert_eq!(outcome.best.map(|p| p.uid), Some(0));
        assert_eq!(outcome.score, -60.0);
        assert_eq!(outcome.error_estimate, 160);
    }

    #[test]
    fn test_to_fix() {
        let points = vec![point(5, &[("A", -40)])];
        let fix = Matcher::default()
            .find_match(&scan(&[("A", -43)]), &points)
            .to_fix()
            .unwrap();
        assert_eq!(fix.uid, 5);
        assert_eq!(fix.error_db, 3);
        assert_eq!(fix.method, METHOD_WEIGHTED_FINGERPRINT);
    }
}
