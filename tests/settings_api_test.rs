// ==========================================
// 设置 API 测试
// ==========================================
// 测试目标: 除数读取默认标记、写入校验、非法输入不修改设置
// ==========================================


use imp_server::api::ApiError;
use imp_server::domain::types::FactorSource;
use test_helpers::TestLayout;

#[tokio::test]
async fn test_get_reports_default_when_unreadable() {
    let layout = TestLayout::new();
    let state = layout.app_state();

    let view = state.settings_api.get_division_factor().await;
    assert_eq!(view.value, 4);
    assert!(view.is_default);
    assert_eq!(view.source, FactorSource::DefaultMissing);
}

#[tokio::test]
async fn test_set_then_get() {
    let layout = TestLayout::new();
    let state = layout.app_state();

    assert_eq!(state.settings_api.set_division_factor(" 7 ").await.unwrap(), 7);
    assert_eq!(std::fs::read_to_string(&layout.config.settings_file).unwrap(), "7");

    let view = state.settings_api.get_division_factor().await;
    assert_eq!(view.value, 7);
    assert!(!view.is_default);
}

#[tokio::test]
async fn test_invalid_values_rejected_without_mutation() {
    let layout = TestLayout::new();
    layout.write_settings("5");
    let state = layout.app_state();

    for raw in ["0", "-1", "abc", "", "2.5"] {
        let err = state.settings_api.set_division_factor(raw).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)), "input {:?}", raw);
    }
    assert_eq!(std::fs::read_to_string(&layout.config.settings_file).unwrap(), "5");
}

#[tokio::test]
async fn test_skip_patterns_surface() {
    let layout = TestLayout::new();
    let state = layout.app_state();
    assert_eq!(state.settings_api.get_skip_patterns(), vec!["-VKa".to_string()]);

    layout.write_skip_patterns("-AA\n\n-BB\n");
    state.settings_api.reload_skip_patterns().await;
    assert_eq!(
        state.settings_api.get_skip_patterns(),
        vec!["-AA".to_string(), "-BB".to_string()]
    );
}
