//! 蓝牙扫描适配
//!
//! 在第一个蓝牙适配器上扫描一个时间窗口，按设备名称正则过滤，
//! 以外设地址作为接入点标识，结果写入 [`ScanCache`] 后按强度排序返回。
//! 每个窗口开始时清空缓存，返回的观测都来自本窗口；没有 RSSI 的外设不记录。

use crate::config::{ConfigError, ScannerConfig};
use crate::error::{PositioningError, Result};
use crate::fingerprint::SignalRecord;
use crate::scanner::{ScanCache, Scanner};
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager as PlatformManager};
use regex::Regex;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// 基于 btleplug 的扫描器
pub struct BleScanner {
    /// 设备名称过滤
    pattern: Regex,
    /// 单次扫描窗口
    scan_window: Duration,
    /// 轮询间隔，避免 CPU 占用过高
    poll_interval: Duration,
    cache: ScanCache,
}

impl BleScanner {
    pub fn new(pattern: Regex, scan_window: Duration, expiration_seconds: i64) -> Self {
        BleScanner {
            pattern,
            scan_window,
            poll_interval: Duration::from_millis(500),
            cache: ScanCache::new(expiration_seconds),
        }
    }

    pub fn from_config(config: &ScannerConfig) -> std::result::Result<Self, ConfigError> {
        let pattern =
            Regex::new(&config.name_pattern).map_err(|e| ConfigError::InvalidValue {
                key: "scanner.name_pattern".to_string(),
                value: config.name_pattern.clone(),
                reason: e.to_string(),
            })?;

        let mut scanner = Self::new(
            pattern,
            Duration::from_millis(config.scan_window_ms),
            config.expiration_secs,
        );
        scanner.poll_interval = Duration::from_millis(config.poll_interval_ms.max(1));
        Ok(scanner)
    }

    /// 共享的观测缓存
    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// 名称是否通过过滤
    pub fn accepts(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// 开始新的扫描窗口，丢弃上一个窗口的观测
    async fn reset_window(&self) {
        self.cache.clear().await;
    }

    async fn collect_window(&self) -> Result<usize> {
        let manager = PlatformManager::new()
            .await
            .map_err(|e| PositioningError::Scan(format!("蓝牙管理器初始化失败: {}", e)))?;

        let adapters = manager
            .adapters()
            .await
            .map_err(|e| PositioningError::Scan(format!("获取蓝牙适配器失败: {}", e)))?;

        let Some(adapter) = adapters.first() else {
            return Err(PositioningError::Scan("未找到蓝牙适配器".to_string()));
        };

        self.reset_window().await;
        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| PositioningError::Scan(format!("启动蓝牙扫描失败: {}", e)))?;

        let polled = self.poll_peripherals(adapter).await;

        if let Err(e) = adapter.stop_scan().await {
            warn!("停止蓝牙扫描失败: {}", e);
        }
        polled
    }

    /// 在扫描窗口内轮询外设，返回写入缓存的观测次数
    async fn poll_peripherals(&self, adapter: &Adapter) -> Result<usize> {
        let start_time = Instant::now();
        let mut received = 0;

        while start_time.elapsed() < self.scan_window {
            let peripherals = adapter
                .peripherals()
                .await
                .map_err(|e| PositioningError::Scan(format!("获取外设失败: {}", e)))?;

            for peripheral in peripherals {
                let Ok(Some(properties)) = peripheral.properties().await else {
                    continue;
                };
                let (Some(name), Some(rssi)) = (properties.local_name, properties.rssi) else {
                    continue;
                };
                if !self.accepts(&name) {
                    continue;
                }

                let record =
                    SignalRecord::with_name(peripheral.address().to_string(), i32::from(rssi), name);
                self.cache.insert(record).await;
                received += 1;
            }

            sleep(self.poll_interval).await;
        }

        Ok(received)
    }
}

impl Scanner for BleScanner {
    async fn scan(&self) -> Result<Vec<SignalRecord>> {
        let received = self.collect_window().await?;
        let ranked = self.cache.ranked().await;

        info!(
            updates = received,
            visible = ranked.len(),
            "蓝牙扫描完成"
        );
        for (idx, record) in ranked.iter().take(3).enumerate() {
            debug!(
                rank = idx + 1,
                address = %record.identifier,
                name = record.name.as_deref().unwrap_or("-"),
                rssi = record.strength,
                "最强信号"
            );
        }
        Ok(ranked)
    }
}
