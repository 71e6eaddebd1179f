//! 扫描观测缓存（线程安全）

use crate::fingerprint::{SignalRecord, rank_scan};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 单个接入点的最新观测
#[derive(Clone, Debug)]
pub struct CachedObservation {
    pub record: SignalRecord,
    /// 最后更新时间
    pub last_seen: DateTime<Local>,
}

/// 按接入点标识缓存最新观测，超过过期时间的观测在读取时清理
#[derive(Clone)]
pub struct ScanCache {
    /// key 为接入点标识
    observations: Arc<Mutex<HashMap<String, CachedObservation>>>,
    /// 过期时间（秒）
    expiration_seconds: i64,
}

impl ScanCache {
    pub fn new(expiration_seconds: i64) -> Self {
        ScanCache {
            observations: Arc::new(Mutex::new(HashMap::new())),
            expiration_seconds,
        }
    }

    /// 插入或更新观测
    pub async fn insert(&self, record: SignalRecord) {
        self.insert_at(record, Local::now()).await;
    }

    /// 以指定时间插入观测
    pub async fn insert_at(&self, record: SignalRecord, last_seen: DateTime<Local>) {
        let mut cache = self.observations.lock().await;
        cache.insert(
            record.identifier.clone(),
            CachedObservation { record, last_seen },
        );
    }

    /// 清理过期观测后，按信号强度从强到弱返回
    pub async fn ranked(&self) -> Vec<SignalRecord> {
        let mut cache = self.observations.lock().await;
        let now = Local::now();

        cache.retain(|_, observation| {
            let elapsed = now.signed_duration_since(observation.last_seen);
            elapsed.num_seconds() < self.expiration_seconds
        });

        rank_scan(cache.values().map(|o| o.record.clone()).collect())
    }

    pub async fn get(&self, identifier: &str) -> Option<CachedObservation> {
        let cache = self.observations.lock().await;
        cache.get(identifier).cloned()
    }

    pub async fn len(&self) -> usize {
        let cache = self.observations.lock().await;
        cache.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut cache = self.observations.lock().await;
        cache.clear();
    }
}
