//! 回放扫描器

use crate::error::Result;
use crate::fingerprint::{SignalRecord, rank_scan};
use crate::scanner::Scanner;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// 依次返回预先准备的扫描，用完后返回空扫描
pub struct ReplayScanner {
    scans: Mutex<VecDeque<Vec<SignalRecord>>>,
}

impl ReplayScanner {
    pub fn new(scans: Vec<Vec<SignalRecord>>) -> Self {
        ReplayScanner {
            scans: Mutex::new(scans.into()),
        }
    }

    /// 从 (标识, 强度) 对创建
    pub fn from_pairs(scans: Vec<Vec<(&str, i32)>>) -> Self {
        Self::new(
            scans
                .into_iter()
                .map(|scan| {
                    scan.into_iter()
                        .map(|(id, dbm)| SignalRecord::new(id, dbm))
                        .collect()
                })
                .collect(),
        )
    }

    /// 追加一次扫描
    pub async fn push(&self, scan: Vec<SignalRecord>) {
        self.scans.lock().await.push_back(scan);
    }

    pub async fn remaining(&self) -> usize {
        self.scans.lock().await.len()
    }
}

impl Scanner for ReplayScanner {
    async fn scan(&self) -> Result<Vec<SignalRecord>> {
        let next = self.scans.lock().await.pop_front();
        Ok(next.map(rank_scan).unwrap_or_default())
    }
}
