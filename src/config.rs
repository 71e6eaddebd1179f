//! 配置文件读写
//!
//! JSON 格式，缺省字段使用默认值；文件不存在时直接返回默认配置。

use crate::fingerprint::MatcherConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败: {0}")]
    Read(#[from] std::io::Error),

    #[error("解析配置文件失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("写入配置文件失败: {0}")]
    Write(String),

    #[error("配置无效: {key} = '{value}' - {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// 扫描参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// 设备名称过滤正则
    pub name_pattern: String,
    /// 单次扫描窗口（毫秒）
    pub scan_window_ms: u64,
    /// 扫描窗口内轮询外设的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 观测过期时间（秒）
    pub expiration_secs: i64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            name_pattern: ".*".to_string(),
            scan_window_ms: 3000,
            poll_interval_ms: 500,
            expiration_secs: 15,
        }
    }
}

/// 存储参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 参考点文件路径
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: PathBuf::from("reference_points.jsonl"),
        }
    }
}

/// 完整配置
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub matcher: MatcherConfig,
    pub scanner: ScannerConfig,
    pub store: StoreConfig,
    /// DEBUG 级别日志
    pub verbose: bool,
}

impl NavConfig {
    /// 从指定路径加载，文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: NavConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存到指定路径，必要时创建父目录
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::Write(e.to_string()))
    }

    /// 校验配置的合理性
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (rank, weight) in self.matcher.weights.iter().enumerate() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(invalid(
                    format!("matcher.weights[{}]", rank),
                    weight,
                    "权重必须是非负有限数",
                ));
            }
        }

        if self.scanner.scan_window_ms == 0 {
            return Err(invalid("scanner.scan_window_ms", 0, "扫描窗口必须大于 0"));
        }
        if self.scanner.expiration_secs <= 0 {
            return Err(invalid(
                "scanner.expiration_secs",
                self.scanner.expiration_secs,
                "过期时间必须大于 0",
            ));
        }
        if let Err(e) = Regex::new(&self.scanner.name_pattern) {
            return Err(invalid(
                "scanner.name_pattern",
                &self.scanner.name_pattern,
                &e.to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid(key: impl Into<String>, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = NavConfig::load_from(&temp_dir.path().join("navinside.json")).unwrap();
        assert_eq!(config, NavConfig::default());
        assert_eq!(config.matcher.weights, [1.0, 0.6, 0.3]);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("navinside.json");

        let mut config = NavConfig::default();
        config.scanner.name_pattern = "^RFstar".to_string();
        config.store.path = PathBuf::from("/var/lib/navinside/points.jsonl");
        config.verbose = true;
        config.save_to(&path).unwrap();

        assert_eq!(NavConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("navinside.json");
        std::fs::write(&path, r#"{ "scanner": { "scan_window_ms": 1500 } }"#).unwrap();

        let config = NavConfig::load_from(&path).unwrap();
        assert_eq!(config.scanner.scan_window_ms, 1500);
        assert_eq!(config.scanner.expiration_secs, 15);
        assert_eq!(config.matcher, MatcherConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = NavConfig::default();
        config.matcher.weights[2] = -0.3;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        let mut config = NavConfig::default();
        config.scanner.name_pattern = "([".to_string();
        assert!(config.validate().is_err());

        let mut config = NavConfig::default();
        config.scanner.scan_window_ms = 0;
        assert!(config.validate().is_err());
    }
}
