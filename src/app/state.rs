// ==========================================
// IMP 批次导入服务 - 应用状态
// ==========================================
// 职责: 组装共享组件与 API 实例，启动目录监听
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{BatchApi, SettingsApi, SnapshotApi};
use crate::config::{ConfigStore, ServerConfig};
use crate::importer::{BatchPipeline, StageWriter};
use crate::repository::BatchLogRepository;
use crate::snapshot::SnapshotPublisher;
use crate::watcher::{Dispatcher, EventRouter, InFlightTracker, WatcherHandle};

/// 应用状态
///
/// 包含所有 API 实例和共享组件，进程内单实例
pub struct AppState {
    /// 服务配置
    pub config: ServerConfig,

    /// 设置存储（除数 / 跳过模式）
    pub config_store: Arc<ConfigStore>,

    /// 快照发布者
    pub publisher: Arc<SnapshotPublisher>,

    /// 批次流水线
    pub pipeline: Arc<BatchPipeline>,

    /// 批次日志仓储
    pub batch_log_repo: Arc<BatchLogRepository>,

    /// 在途文件跟踪
    pub inflight: Arc<InFlightTracker>,

    /// 设置 API
    pub settings_api: Arc<SettingsApi>,

    /// 快照 API
    pub snapshot_api: Arc<SnapshotApi>,

    /// 批次日志 API
    pub batch_api: Arc<BatchApi>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// 该方法会：
    /// 1. 创建目录布局
    /// 2. 打开批次日志数据库
    /// 3. 组装设置存储、流水线、快照发布者与 API
    pub fn new(config: ServerConfig) -> Result<Self, String> {
        tracing::info!(
            inbox = %config.inbox_dir.display(),
            cache = %config.cache_dir.display(),
            archive = %config.archive_dir.display(),
            "初始化AppState"
        );

        config
            .ensure_directories()
            .map_err(|e| format!("无法创建服务目录: {}", e))?;

        // 批次日志数据库（共享连接）
        let conn = crate::db::open_sqlite_connection(&config.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));
        let batch_log_repo = Arc::new(BatchLogRepository::new(conn));

        let config_store = Arc::new(ConfigStore::new(
            &config.settings_file,
            &config.skip_patterns_file,
        ));

        let publisher = Arc::new(SnapshotPublisher::new(
            config.canonical_path(),
            config.push_channel_capacity,
        ));

        let pipeline = Arc::new(
            BatchPipeline::new(
                &config.inbox_dir,
                config_store.clone(),
                StageWriter::new(&config.cache_dir, &config.archive_dir),
            )
            .with_journal(batch_log_repo.clone()),
        );

        let settings_api = Arc::new(SettingsApi::new(config_store.clone()));
        let snapshot_api = Arc::new(SnapshotApi::new(publisher.clone()));
        let batch_api = Arc::new(BatchApi::new(batch_log_repo.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            config,
            config_store,
            publisher,
            pipeline,
            batch_log_repo,
            inflight: Arc::new(InFlightTracker::new()),
            settings_api,
            snapshot_api,
            batch_api,
        })
    }

    /// 构造事件分发器（与监听共享在途跟踪）
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            EventRouter::new(&self.config),
            self.pipeline.clone(),
            self.config_store.clone(),
            self.publisher.clone(),
            self.inflight.clone(),
            self.config.settle_delay(),
            self.config.grace_delay(),
        )
    }

    /// 被监听的目录（去重）
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            self.config.inbox_dir.clone(),
            self.config.cache_dir.clone(),
            self.config.archive_dir.clone(),
        ];
        if let Some(parent) = self.config.skip_patterns_file.parent() {
            if !parent.as_os_str().is_empty() && !dirs.iter().any(|d| d == parent) {
                dirs.push(parent.to_path_buf());
            }
        }
        dirs
    }

    /// 启动服务
    ///
    /// 1. 加载跳过模式
    /// 2. 加载初始快照
    /// 3. 启动目录监听
    pub async fn start(&self) -> Result<WatcherHandle, String> {
        let reload = self.config_store.reload_skip_patterns().await;
        tracing::info!(result = ?reload, "初始跳过模式加载完成");

        if let Err(e) = self.publisher.refresh().await {
            tracing::warn!(error = %e, "初始快照加载失败");
        }

        WatcherHandle::start(
            &self.watched_dirs(),
            Arc::new(self.dispatcher()),
            self.config.event_queue_capacity,
        )
        .map_err(|e| format!("无法启动目录监听: {}", e))
    }
}
