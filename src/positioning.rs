//! 室内定位服务
//!
//! 把扫描器、参考点存储、匹配器和训练会话组合在一起：
//! - 定位：扫描 → 读取参考点快照 → 指纹匹配
//! - 训练：会话事件 → 录制扫描 → 结束时插值生成参考点并批量写入
//!
//! 匹配与插值本身都是纯函数，所有 I/O 都在这里完成。

use crate::config::NavConfig;
use crate::error::{PositioningError, Result};
use crate::fingerprint::{
    Matcher, PositionFix, RecordingSession, ReferencePoint, SessionEvent, SessionState,
    SignalRecord, Transition, TransitionOutcome, rank_scan,
};
use crate::pending::Pending;
use crate::scanner::{BleScanner, Scanner};
use crate::store::{JsonLinesStore, ReferenceStore, SharedStore};
use std::sync::Arc;
use tracing::{info, warn};

/// 室内定位服务
pub struct IndoorPositioner<S, C> {
    store: SharedStore<S>,
    scanner: Arc<C>,
    matcher: Matcher,
    session: RecordingSession,
}

impl<S: ReferenceStore + 'static, C: Scanner> IndoorPositioner<S, C> {
    pub fn new(store: S, scanner: C, matcher: Matcher) -> Self {
        Self::with_shared(SharedStore::new(store), Arc::new(scanner), matcher)
    }

    /// 使用已共享的存储和扫描器（多个服务实例共用同一个库）
    pub fn with_shared(store: SharedStore<S>, scanner: Arc<C>, matcher: Matcher) -> Self {
        IndoorPositioner {
            store,
            scanner,
            matcher,
            session: RecordingSession::new(),
        }
    }

    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// 在后台发起一次扫描
    pub fn request_scan(&self) -> Pending<Result<Vec<SignalRecord>>> {
        let scanner = Arc::clone(&self.scanner);
        Pending::spawn(async move { scanner.scan().await.map(rank_scan) })
    }

    /// 在后台读取参考点快照
    pub fn request_snapshot(&self) -> Pending<Result<Vec<ReferencePoint>>> {
        let store = self.store.clone();
        Pending::spawn(async move { store.snapshot().await.map_err(PositioningError::from) })
    }

    /// 扫描并定位
    ///
    /// 参考点库为空时返回 `EmptyStore`，没有重叠时返回 `NoMatch`。
    pub async fn locate(&self) -> Result<PositionFix> {
        if self.store.count().await? == 0 {
            warn!("参考点库为空，无法进行室内定位");
            return Err(PositioningError::EmptyStore);
        }

        let scan = self.request_scan().resolve().await?;
        self.locate_with(&scan).await
    }

    /// 使用给定的实时扫描定位
    pub async fn locate_with(&self, live_scan: &[SignalRecord]) -> Result<PositionFix> {
        let points = self.request_snapshot().resolve().await?;
        if points.is_empty() {
            return Err(PositioningError::EmptyStore);
        }

        let live = rank_scan(live_scan.to_vec());
        let outcome = self.matcher.find_match(&live, &points);
        match outcome.to_fix() {
            Some(fix) => {
                info!(score = fix.score, "{}", fix.describe());
                Ok(fix)
            }
            None => {
                info!(points = points.len(), "No matching reference point found");
                Err(PositioningError::NoMatch)
            }
        }
    }

    /// 处理一个训练会话事件
    ///
    /// 录制结束时生成参考点并写入存储，返回写入的参考点；
    /// 会话中的扫描无论写入成功与否都会被丢弃。
    pub async fn handle(&mut self, event: SessionEvent) -> Result<Option<Vec<ReferencePoint>>> {
        let session = std::mem::take(&mut self.session);
        let Transition { session, outcome } = session.apply(event);
        self.session = session;

        match outcome {
            TransitionOutcome::Moved | TransitionOutcome::Ignored => Ok(None),
            TransitionOutcome::Rejected(e) => Err(e),
            TransitionOutcome::Completed(completed) => {
                let points = self
                    .store
                    .insert_batch(|first_uid| completed.finalize(first_uid))
                    .await?;
                info!(
                    readings = completed.readings.len(),
                    elapsed_ms = completed.total_elapsed_ms,
                    "训练会话完成"
                );
                Ok(Some(points))
            }
        }
    }

    /// 录制期间扫描一次并记入会话，返回当前已收集的扫描数量
    pub async fn record_scan(&mut self, elapsed_ms: u64) -> Result<usize> {
        if !self.session.is_recording() {
            return Ok(0);
        }

        let scan = self.request_scan().resolve().await?;
        self.handle(SessionEvent::ScanReceived { elapsed_ms, scan })
            .await?;
        Ok(self.session.reading_count())
    }

    /// 清空参考点库
    pub async fn clear_reference_points(&self) -> Result<()> {
        self.store.clear().await?;
        info!("参考点库已清空");
        Ok(())
    }
}

impl IndoorPositioner<JsonLinesStore, BleScanner> {
    /// 根据配置创建：JSON 行文件存储 + 蓝牙扫描
    pub fn from_config(config: &NavConfig) -> Result<Self> {
        config.validate()?;
        let store = JsonLinesStore::open(&config.store.path)?;
        let scanner = BleScanner::from_config(&config.scanner)?;
        let matcher = Matcher::new(config.matcher.clone());
        Ok(Self::new(store, scanner, matcher))
    }
}
