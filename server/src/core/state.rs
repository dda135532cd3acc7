//! Server state and change broadcasting

use std::sync::Arc;

use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use shared::message::ChangeNotice;

use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrdersManager;

/// Broadcast channel capacity; slow subscribers lag and resync
const CHANGE_CHANNEL_CAPACITY: usize = 4096;

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增，
/// 客户端通过版本号判断数据新旧。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 (目录、历史) |
/// | orders | 活跃订单引擎 (redb) |
/// | resource_versions | 资源版本管理 |
/// | change_tx | 变更广播通道 (SSE 推送) |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub orders: Arc<OrdersManager>,
    pub resource_versions: Arc<ResourceVersions>,
    change_tx: broadcast::Sender<ChangeNotice>,
}

impl ServerState {
    /// 初始化服务器状态：工作目录 → SQLite → 订单引擎
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir()?;

        let db = DbService::new(&config.sqlite_path().to_string_lossy())
            .await
            .map_err(|e| anyhow::anyhow!("database init failed: {e}"))?;

        let orders = OrdersManager::new(config.orders_db_path())
            .map_err(|e| anyhow::anyhow!("order store init failed: {e}"))?;

        Ok(Self::new(config.clone(), db.pool, Arc::new(orders)))
    }

    /// 手动构造 (测试用)
    pub fn new(config: Config, pool: SqlitePool, orders: Arc<OrdersManager>) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            config,
            pool,
            orders,
            resource_versions: Arc::new(ResourceVersions::new()),
            change_tx,
        }
    }

    /// Subscribe to the change feed (SSE endpoint)
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeNotice> {
        self.change_tx.subscribe()
    }

    /// 广播资源变更通知
    ///
    /// 向所有订阅终端推送变更；版本号自动递增。发布相对于已提交的
    /// 变更是 fire-and-forget：没有订阅者也不会失败。
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let notice = ChangeNotice {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        if self.change_tx.send(notice).is_err() {
            tracing::debug!(resource, action, "No active change subscribers");
        }
    }
}
