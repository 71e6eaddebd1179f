//! 训练会话状态机
//!
//! 状态: `Idle → SettingStart → StartSet → SettingEnd → StartAndEndSet → Recording → Idle`
//!
//! 会话是一个普通的值，`apply` 消耗旧状态并返回新状态，不依赖任何全局变量。

use crate::error::{PositioningError, Result};
use crate::fingerprint::reference::{Coordinate, ReferencePoint};
use crate::fingerprint::signal::SignalRecord;
use crate::fingerprint::trainer::{TrainingReading, finalize_session};
use tracing::debug;

/// 对外可见的会话状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    SettingStart,
    StartSet,
    SettingEnd,
    EndSet,
    StartAndEndSet,
    Recording,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    SettingStart,
    SettingEnd,
    Recording,
}

/// 驱动会话的事件
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// 下一次点击地图设置起点
    SetStart,
    /// 下一次点击地图设置终点
    SetEnd,
    /// 用户点击地图
    MapTap(Coordinate),
    StartRecording,
    /// 录制期间收到一次扫描
    ScanReceived {
        elapsed_ms: u64,
        scan: Vec<SignalRecord>,
    },
    StopRecording {
        elapsed_ms: u64,
    },
}

/// 录制结束后交给训练算法的数据
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedSession {
    pub start: Coordinate,
    pub end: Coordinate,
    pub readings: Vec<TrainingReading>,
    pub total_elapsed_ms: u64,
}

impl CompletedSession {
    /// 生成参考点，编号从 `first_uid` 开始
    pub fn finalize(&self, first_uid: u32) -> Result<Vec<ReferencePoint>> {
        finalize_session(
            self.start,
            self.end,
            &self.readings,
            self.total_elapsed_ms,
            first_uid,
        )
    }
}

/// 一次状态转换的结果
#[derive(Debug)]
pub enum TransitionOutcome {
    /// 状态已改变或记录了新的扫描
    Moved,
    /// 事件在当前状态下无意义，状态不变
    Ignored,
    /// 录制结束，会话数据已移出
    Completed(CompletedSession),
    /// 事件违反前置条件，状态不变
    Rejected(PositioningError),
}

#[derive(Debug)]
pub struct Transition {
    pub session: RecordingSession,
    pub outcome: TransitionOutcome,
}

/// 训练会话
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingSession {
    phase: Phase,
    start: Option<Coordinate>,
    end: Option<Coordinate>,
    readings: Vec<TrainingReading>,
}

impl RecordingSession {
    pub fn new() -> Self {
        RecordingSession {
            phase: Phase::Idle,
            start: None,
            end: None,
            readings: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Recording => SessionState::Recording,
            Phase::SettingStart => SessionState::SettingStart,
            Phase::SettingEnd => SessionState::SettingEnd,
            Phase::Idle => match (self.start, self.end) {
                (None, None) => SessionState::Idle,
                (Some(_), None) => SessionState::StartSet,
                (None, Some(_)) => SessionState::EndSet,
                (Some(_), Some(_)) => SessionState::StartAndEndSet,
            },
        }
    }

    pub fn start(&self) -> Option<Coordinate> {
        self.start
    }

    pub fn end(&self) -> Option<Coordinate> {
        self.end
    }

    /// 当前录制中已收集的扫描数量
    pub fn reading_count(&self) -> usize {
        self.readings.len()
    }

    pub fn is_recording(&self) -> bool {
        self.phase == Phase::Recording
    }

    /// 应用一个事件，返回新状态
    pub fn apply(mut self, event: SessionEvent) -> Transition {
        let before = self.state();
        let outcome = match (self.phase, event) {
            (Phase::Recording, SessionEvent::ScanReceived { elapsed_ms, scan }) => {
                self.readings.push(TrainingReading::new(elapsed_ms, scan));
                TransitionOutcome::Moved
            }
            (Phase::Recording, SessionEvent::StopRecording { elapsed_ms }) => {
                self.phase = Phase::Idle;
                match (self.start, self.end) {
                    (Some(start), Some(end)) => TransitionOutcome::Completed(CompletedSession {
                        start,
                        end,
                        readings: std::mem::take(&mut self.readings),
                        total_elapsed_ms: elapsed_ms,
                    }),
                    _ => {
                        self.readings.clear();
                        TransitionOutcome::Rejected(PositioningError::InvalidSession(
                            "录制中丢失了起点或终点".to_string(),
                        ))
                    }
                }
            }
            (Phase::Recording, _) => TransitionOutcome::Ignored,
            (_, SessionEvent::SetStart) => {
                self.phase = Phase::SettingStart;
                TransitionOutcome::Moved
            }
            (_, SessionEvent::SetEnd) => {
                self.phase = Phase::SettingEnd;
                TransitionOutcome::Moved
            }
            (Phase::SettingStart, SessionEvent::MapTap(position)) => {
                self.start = Some(position);
                self.phase = Phase::Idle;
                TransitionOutcome::Moved
            }
            (Phase::SettingEnd, SessionEvent::MapTap(position)) => {
                self.end = Some(position);
                self.phase = Phase::Idle;
                TransitionOutcome::Moved
            }
            (_, SessionEvent::StartRecording) => {
                if self.start.is_some() && self.end.is_some() {
                    self.phase = Phase::Recording;
                    self.readings.clear();
                    TransitionOutcome::Moved
                } else {
                    TransitionOutcome::Rejected(PositioningError::InvalidSession(
                        "需要先设置起点和终点".to_string(),
                    ))
                }
            }
            _ => TransitionOutcome::Ignored,
        };

        debug!(from = ?before, to = ?self.state(), "训练会话状态转换");
        Transition {
            session: self,
            outcome,
        }
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
