//! 服务器配置
//!
//! # 环境变量
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | WORK_DIR | /var/lib/comanda | 工作目录 (数据库、日志) |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | TIMEZONE | America/Bogota | 营业时区 |
//! | LOG_DIR | (无) | 日志文件目录，未设置时仅输出到终端 |
//!
//! # 示例
//!
//! ```ignore
//! WORK_DIR=/data/comanda HTTP_PORT=8080 cargo run
//! ```

use std::path::PathBuf;

use chrono_tz::Tz;

/// Server configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库与日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 营业时区
    pub timezone: Tz,
    /// 日志目录 (可选)
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置，未设置时使用默认值
    pub fn from_env() -> Self {
        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|tz| tz.parse().ok())
            .unwrap_or(chrono_tz::America::Bogota);

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/comanda".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone,
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// SQLite 数据库文件路径
    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("comanda.db")
    }

    /// redb 活跃订单库路径
    pub fn orders_db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("orders.redb")
    }

    /// 确保工作目录存在
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)
    }
}
