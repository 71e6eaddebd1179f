//! 日志初始化
//!
//! 输出到 stdout，默认 INFO 级别，verbose 时为 DEBUG；
//! 设置了 `RUST_LOG` 环境变量时以其为准。

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// 初始化全局日志订阅者
///
/// 重复调用时保留第一次的设置，返回是否本次完成了安装。
pub fn init_logging(verbose: bool) -> bool {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_span_events(if verbose {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .try_init()
        .is_ok();

    if installed && verbose {
        tracing::info!("已启用详细日志 (DEBUG)");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false);
        assert!(!init_logging(true));
    }
}
