//! 日志初始化
//!
//! 优先使用 `RUST_LOG`，否则默认 `info`（详细模式下为 `debug`）

use tracing_subscriber::EnvFilter;

/// 初始化全局日志
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（例如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
