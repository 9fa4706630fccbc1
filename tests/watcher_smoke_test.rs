// ==========================================
// 目录监听冒烟测试
// ==========================================
// 测试目标: 真实文件系统通知驱动完整流程
// ==========================================


use std::time::Duration;
use test_helpers::{canonical_line, wait_until, TestLayout};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_file_is_processed_and_published() {
    let layout = TestLayout::new();
    let state = layout.app_state();
    let handle = state.start().await.unwrap();

    // 启动时规范文件不存在
    assert!(state.snapshot_api.get_current().unwrap().is_no_data());

    let content = canonical_line("COIL0001ABCDEF", "40");
    layout.write_inbox("Dimter.imp", &content);

    let cache = layout.cache_path("Dimter.imp");
    let processed = wait_until(Duration::from_secs(10), || cache.exists()).await;
    assert!(processed, "batch was not processed");

    let published = wait_until(Duration::from_secs(10), || {
        state
            .snapshot_api
            .get_current()
            .map(|s| s.len() == 1)
            .unwrap_or(false)
    })
    .await;
    assert!(published, "snapshot was not refreshed");

    let snapshot = state.snapshot_api.get_current().unwrap();
    let entry = &snapshot.entries().unwrap()[0];
    assert_eq!(entry.id, "COIL0001ABCD");
    assert_eq!(entry.value, "40");

    handle.shutdown().await;
}
