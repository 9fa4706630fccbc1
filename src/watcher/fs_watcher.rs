// ==========================================
// IMP 批次导入服务 - 文件系统通知桥接
// ==========================================
// 职责: notify 回调线程 → 有界 tokio 队列
// 说明: 回调运行在 notify 的后台线程，使用 blocking_send 形成背压
// ==========================================

use crate::watcher::error::{WatchError, WatchResult};
use crate::watcher::event_router::RawFsEvent;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// 创建并启动文件系统监听
///
/// 返回的 watcher 被丢弃时停止监听，同时关闭事件队列的发送端。
pub fn spawn_fs_watcher(
    dirs: &[PathBuf],
    tx: mpsc::Sender<RawFsEvent>,
) -> WatchResult<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<Event>| match result {
            Ok(event) => {
                for raw in translate(&event) {
                    if tx.blocking_send(raw).is_err() {
                        // 接收端已关闭（正在停止）
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "文件系统通知错误"),
        },
        Config::default(),
    )?;

    for dir in dirs {
        if !dir.is_dir() {
            return Err(WatchError::Directory {
                path: dir.display().to_string(),
                message: "目录不存在".to_string(),
            });
        }
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::info!(dir = %dir.display(), "开始监听目录");
    }

    Ok(watcher)
}

/// notify 事件 → 原始事件
pub fn translate(event: &Event) -> Vec<RawFsEvent> {
    match event.kind {
        EventKind::Create(_) => event.paths.iter().map(RawFsEvent::upserted).collect(),
        EventKind::Remove(_) => event.paths.iter().map(RawFsEvent::removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            event.paths.iter().map(RawFsEvent::removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths = [原路径, 新路径]
            let mut out = Vec::with_capacity(event.paths.len());
            if let Some(from) = event.paths.first() {
                out.push(RawFsEvent::removed(from));
            }
            out.extend(event.paths.iter().skip(1).map(RawFsEvent::upserted));
            out
        }
        EventKind::Modify(_) => event.paths.iter().map(RawFsEvent::upserted).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}
