use std::sync::Arc;

use attendance_core::CoreRuntime;
use attendance_core::api::{AttendanceApi, HttpApi};
use attendance_core::attendance::locator::{FixedLocator, Locator};
use attendance_core::config::Config;
use attendance_core::realtime::transport::{ChannelTransport, WsTransport};
use attendance_core::store::{CredentialStore, FileCredentialStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 固定位置考勤终端的常驻进程：
// 加载配置、注入真实协作方、启动核心并等待退出信号

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(&config.store_path));
    let api: Arc<dyn AttendanceApi> =
        Arc::new(HttpApi::new(&config).expect("Failed to create HTTP client"));
    let locator: Arc<dyn Locator> = Arc::new(FixedLocator::new(
        config.device_latitude,
        config.device_longitude,
        config.device_accuracy_meters,
    ));
    let transport: Arc<dyn ChannelTransport> = Arc::new(WsTransport);

    let runtime = CoreRuntime::new(config, store, api, locator, transport);

    // 会话与自动考勤事件打到日志
    runtime.session.on_event(|event| {
        tracing::info!("会话事件: {:?}", event);
    });
    runtime.tracker.on_notice(|notice| {
        tracing::info!("自动考勤提醒: {:?}", notice);
    });

    runtime.init();
    // 终端设备常驻前台，直接开始采样
    runtime.on_foreground();

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c");
    runtime.teardown();
}
