//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::{ClientError, ClientResult};

/// Production API endpoint
pub const DEFAULT_API_URL: &str = "https://bet-el-bon-api.vercel.app/api";

/// Client configuration
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | BON_API_URL | https://bet-el-bon-api.vercel.app/api | API 地址 |
/// | BON_DATA_DIR | ./bon-data | 本地存储目录 |
/// | BON_REQUEST_TIMEOUT_SECS | 30 | 请求超时(秒) |
/// | BON_ORDER_POLL_MS | 5000 | 我的订单 / 厨房 / 后台订单轮询间隔 |
/// | BON_BOARD_POLL_MS | 3000 | 单个订单 / 收银 / 叫号屏轮询间隔 |
/// | BON_LOG_LEVEL | info | 日志级别 |
/// | BON_LOG_JSON | false | JSON 日志 |
/// | BON_LOG_DIR | (未设置) | 日志文件目录 |
///
/// # 示例
///
/// ```ignore
/// BON_API_URL=http://localhost:5000/api BON_LOG_LEVEL=debug cargo run --bin bon-kiosk
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "https://bet-el-bon-api.vercel.app/api")
    pub api_url: String,

    /// Directory holding the persisted local store
    pub data_dir: PathBuf,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Poll interval for the my-orders, kitchen and admin-orders views (ms)
    pub order_poll_ms: u64,

    /// Poll interval for the single-order, cashier and queue views (ms)
    pub board_poll_ms: u64,

    /// Log level filter (overridden by RUST_LOG)
    pub log_level: String,

    /// Emit JSON logs
    pub log_json: bool,

    /// Optional directory for rolling log files
    pub log_dir: Option<String>,
}

impl ClientConfig {
    /// Create a configuration for the given API base URL
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            data_dir: PathBuf::from("./bon-data"),
            timeout: 30,
            order_poll_ms: 5_000,
            board_poll_ms: 3_000,
            log_level: "info".to_string(),
            log_json: false,
            log_dir: None,
        }
    }

    /// 从环境变量加载配置
    ///
    /// `.env` is read first when present; unset or unparsable variables keep
    /// their defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        Self {
            api_url: std::env::var("BON_API_URL").unwrap_or(defaults.api_url),
            data_dir: std::env::var("BON_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            timeout: env_parse("BON_REQUEST_TIMEOUT_SECS").unwrap_or(defaults.timeout),
            order_poll_ms: env_parse("BON_ORDER_POLL_MS").unwrap_or(defaults.order_poll_ms),
            board_poll_ms: env_parse("BON_BOARD_POLL_MS").unwrap_or(defaults.board_poll_ms),
            log_level: std::env::var("BON_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: env_parse("BON_LOG_JSON").unwrap_or(defaults.log_json),
            log_dir: std::env::var("BON_LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// Set the local data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set both poll intervals
    pub fn with_poll_intervals(mut self, order_ms: u64, board_ms: u64) -> Self {
        self.order_poll_ms = order_ms;
        self.board_poll_ms = board_ms;
        self
    }

    /// Set logging options
    pub fn with_logging(mut self, level: impl Into<String>, json: bool, dir: Option<String>) -> Self {
        self.log_level = level.into();
        self.log_json = json;
        self.log_dir = dir;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn order_poll_interval(&self) -> Duration {
        Duration::from_millis(self.order_poll_ms)
    }

    pub fn board_poll_interval(&self) -> Duration {
        Duration::from_millis(self.board_poll_ms)
    }

    /// Check the configuration before building clients from it
    pub fn validate(&self) -> ClientResult<()> {
        let parsed = url::Url::parse(&self.api_url)
            .map_err(|e| ClientError::Config(format!("invalid BON_API_URL '{}': {e}", self.api_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "BON_API_URL must be http(s), got '{}'",
                parsed.scheme()
            )));
        }
        if self.timeout == 0 {
            return Err(ClientError::Config("request timeout must be positive".into()));
        }
        if self.order_poll_ms == 0 || self.board_poll_ms == 0 {
            return Err(ClientError::Config("poll intervals must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
