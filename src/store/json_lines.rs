//! JSON 行文件参考点存储
//!
//! 每个参考点占一行，字段为
//! `uid, latitude, longitude, bssid_1, db_1, bssid_2, db_2, bssid_3, db_3`。
//! 追加只写文件末尾，清空时截断文件；
//! 写入中断留下的半行在读取时跳过，下一次追加前截掉。

use crate::error::StorageError;
use crate::fingerprint::{ReferencePoint, SignalRecord};
use crate::store::ReferenceStore;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 持久化的单行记录
#[derive(Debug, Serialize, Deserialize)]
struct StoredRow {
    uid: u32,
    latitude: f64,
    longitude: f64,
    bssid_1: String,
    db_1: i32,
    bssid_2: String,
    db_2: i32,
    bssid_3: String,
    db_3: i32,
}

impl From<&ReferencePoint> for StoredRow {
    fn from(point: &ReferencePoint) -> Self {
        let [s1, s2, s3] = &point.signals;
        StoredRow {
            uid: point.uid,
            latitude: point.latitude,
            longitude: point.longitude,
            bssid_1: s1.identifier.clone(),
            db_1: s1.strength,
            bssid_2: s2.identifier.clone(),
            db_2: s2.strength,
            bssid_3: s3.identifier.clone(),
            db_3: s3.strength,
        }
    }
}

impl From<StoredRow> for ReferencePoint {
    fn from(row: StoredRow) -> Self {
        ReferencePoint {
            uid: row.uid,
            latitude: row.latitude,
            longitude: row.longitude,
            signals: [
                SignalRecord::new(row.bssid_1, row.db_1),
                SignalRecord::new(row.bssid_2, row.db_2),
                SignalRecord::new(row.bssid_3, row.db_3),
            ],
        }
    }
}

/// 基于追加式文件的参考点存储
///
/// 不缓存计数，每次都以文件内容为准，同一文件上的多个实例依次写入时编号连续。
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    /// 打开存储文件，文件不存在时视为空库
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let count = read_rows(&path)?.len();
        info!(path = %path.display(), count, "参考点库已加载");
        Ok(JsonLinesStore { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加前处理没有换行结尾的末行：完整的补上换行，写了一半的截掉
    fn seal_tail(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = fs::read(&self.path)?;
        if content.is_empty() || content.ends_with(b"\n") {
            return Ok(());
        }

        let tail_start = content
            .iter()
            .rposition(|byte| *byte == b'\n')
            .map_or(0, |i| i + 1);
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        if serde_json::from_slice::<StoredRow>(&content[tail_start..]).is_ok() {
            file.seek(SeekFrom::End(0))?;
            file.write_all(b"\n")?;
        } else {
            warn!(
                path = %self.path.display(),
                bytes = content.len() - tail_start,
                "截断写入中断的末尾记录"
            );
            file.set_len(tail_start as u64)?;
        }
        Ok(())
    }
}

/// 读取全部参考点
///
/// 文件最后一行没有换行且无法解析时视为写入中断，跳过该行；
/// 其他无法解析的行报告为 `Corrupt`。
fn read_rows(path: &Path) -> Result<Vec<ReferencePoint>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let bytes = fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    let sealed = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();

    let mut points = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<StoredRow>(line) {
            Ok(row) => points.push(row.into()),
            Err(source) if !sealed && index + 1 == lines.len() => {
                warn!(
                    path = %path.display(),
                    line = index + 1,
                    "忽略写入中断的末尾记录: {}",
                    source
                );
            }
            Err(source) => {
                return Err(StorageError::Corrupt {
                    line: index + 1,
                    source,
                });
            }
        }
    }
    Ok(points)
}

impl ReferenceStore for JsonLinesStore {
    fn append(&mut self, point: ReferencePoint) -> Result<(), StorageError> {
        self.append_batch(std::slice::from_ref(&point))
    }

    /// 整批编码后一次写入，写入失败时把文件恢复到原长度
    fn append_batch(&mut self, points: &[ReferencePoint]) -> Result<(), StorageError> {
        if points.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        for point in points {
            let line =
                serde_json::to_string(&StoredRow::from(point)).map_err(StorageError::Encode)?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.seal_tail()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let original_len = file.metadata()?.len();
        if let Err(e) = file.write_all(buffer.as_bytes()) {
            if let Err(rollback) = file.set_len(original_len) {
                warn!(path = %self.path.display(), "回滚未完成的批量写入失败: {}", rollback);
            }
            return Err(e.into());
        }

        debug!(
            first_uid = points[0].uid,
            inserted = points.len(),
            "参考点已写入"
        );
        Ok(())
    }

    fn all(&self) -> Result<Vec<ReferencePoint>, StorageError> {
        read_rows(&self.path)
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(read_rows(&self.path)?.len())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        if self.path.exists() {
            File::create(&self.path)?;
        }
        info!(path = %self.path.display(), "参考点库已清空");
        Ok(())
    }
}
