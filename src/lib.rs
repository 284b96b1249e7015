// 考勤应用客户端运行时核心
// 四个子系统：会话生命周期、位置采样状态机、当日核验缓存、实时通知通道。
// 会话管理器是根：其余子系统只在存在有效会话时工作

use std::sync::{Arc, Mutex};

use tracing::info;

pub mod api;
pub mod attendance;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod listeners;
pub mod realtime;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use api::AttendanceApi;
use attendance::AttendanceTracker;
use attendance::locator::Locator;
use config::Config;
use listeners::ListenerHandle;
use realtime::NotificationChannel;
use realtime::inbox::NotificationInbox;
use realtime::transport::ChannelTransport;
use session::{SessionEvent, SessionManager};
use store::CredentialStore;

/// 客户端核心运行时：显式构造、依赖注入，进程内单实例
pub struct CoreRuntime {
    pub config: Config,
    pub store: Arc<dyn CredentialStore>,
    pub api: Arc<dyn AttendanceApi>,
    pub session: Arc<SessionManager>,
    pub tracker: Arc<AttendanceTracker>,
    pub channel: Arc<NotificationChannel>,
    pub inbox: Arc<NotificationInbox>,
    gate: Mutex<Option<ListenerHandle>>,
}

impl CoreRuntime {
    pub fn new(
        config: Config,
        store: Arc<dyn CredentialStore>,
        api: Arc<dyn AttendanceApi>,
        locator: Arc<dyn Locator>,
        transport: Arc<dyn ChannelTransport>,
    ) -> Self {
        let inbox = Arc::new(NotificationInbox::new());
        let session = Arc::new(SessionManager::new(
            Arc::clone(&store),
            Arc::clone(&api),
            &config,
        ));
        let tracker = Arc::new(AttendanceTracker::new(
            Arc::clone(&api),
            locator,
            Arc::clone(&session),
            &config,
        ));
        let channel = Arc::new(NotificationChannel::new(
            transport,
            Arc::clone(&inbox),
            &config,
        ));
        Self {
            config,
            store,
            api,
            session,
            tracker,
            channel,
            inbox,
            gate: Mutex::new(None),
        }
    }

    /// 启动会话轮询，并把通道和采样循环挂到会话状态上：
    /// 建立会话时打开通知通道，会话结束时停掉通道和采样
    pub fn init(&self) {
        let session = Arc::downgrade(&self.session);
        let tracker = Arc::downgrade(&self.tracker);
        let channel = Arc::downgrade(&self.channel);
        let handle = self.session.on_event(move |event| match event {
            SessionEvent::Authenticated { .. } => {
                let (Some(session), Some(channel)) = (session.upgrade(), channel.upgrade())
                else {
                    return;
                };
                if let Some(active) = session.current_session() {
                    channel.connect(&active.user_id);
                }
            }
            SessionEvent::Unauthenticated => {
                if let Some(tracker) = tracker.upgrade() {
                    tracker.stop();
                }
                if let Some(channel) = channel.upgrade() {
                    channel.disconnect();
                }
            }
        });
        *self.gate.lock().unwrap() = Some(handle);
        self.session.start();
        info!("客户端核心已启动");
    }

    /// 应用进入前台：恢复位置采样
    pub fn on_foreground(&self) {
        self.tracker.start();
    }

    /// 应用退到后台：停止采样，保留最后的考勤状态
    pub fn on_background(&self) {
        self.tracker.stop();
    }

    /// 停止全部子系统；可重复调用
    pub fn teardown(&self) {
        if let Some(handle) = self.gate.lock().unwrap().take() {
            self.session.remove_listener(&handle);
        }
        self.session.stop();
        self.tracker.stop();
        self.channel.disconnect();
        info!("客户端核心已停止");
    }
}
