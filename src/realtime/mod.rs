// 实时通知通道
// 面向当前登录用户的持久连接；断开后固定延迟自动重连，
// 服务端关闭与网络中断走同一条重连路径

pub mod inbox;
pub mod transport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::models::Notification;
use crate::config::Config;
use crate::listeners::{ListenerHandle, ListenerRegistry};
use inbox::NotificationInbox;
use transport::ChannelTransport;

/// 连接阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Closed,
    Open,
}

struct ChannelState {
    phase: ConnectionPhase,
    target_user_id: Option<String>,
}

pub struct NotificationChannel {
    transport: Arc<dyn ChannelTransport>,
    inbox: Arc<NotificationInbox>,
    ws_url: String,
    reconnect_delay: Duration,
    state: Mutex<ChannelState>,
    listeners: ListenerRegistry<Notification>,
    /// connect/disconnect 时自增；旧任务据此失效，
    /// 防止手动断开后仍有残留任务写回状态
    epoch: AtomicU64,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationChannel {
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        inbox: Arc<NotificationInbox>,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            inbox,
            ws_url: config.ws_url.trim_end_matches('/').to_string(),
            reconnect_delay: config.reconnect_delay(),
            state: Mutex::new(ChannelState {
                phase: ConnectionPhase::Closed,
                target_user_id: None,
            }),
            listeners: ListenerRegistry::new(),
            epoch: AtomicU64::new(0),
            task: Mutex::new(None),
        }
    }

    /// 建立面向指定用户的连接。
    /// 已处于 OPEN 且目标一致时为空操作，手动与自动重连竞争不会产生重复连接；
    /// 目标用户不同（用户切换）时旧任务被取代
    pub fn connect(self: &Arc<Self>, user_id: &str) {
        let epoch = {
            let mut state = self.state.lock().unwrap();
            if state.phase == ConnectionPhase::Open
                && state.target_user_id.as_deref() == Some(user_id)
            {
                debug!("通道已打开，忽略重复 connect");
                return;
            }
            state.phase = ConnectionPhase::Open;
            state.target_user_id = Some(user_id.to_string());
            self.epoch.fetch_add(1, Ordering::SeqCst) + 1
        };

        let this = Arc::clone(self);
        let user_id = user_id.to_string();
        let handle = tokio::spawn(async move { this.run(user_id, epoch).await });
        *self.task.lock().unwrap() = Some(handle);
    }

    /// 断开连接并取消待执行的重连；可重复调用
    pub fn disconnect(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
        let mut state = self.state.lock().unwrap();
        state.phase = ConnectionPhase::Closed;
        state.target_user_id = None;
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.state.lock().unwrap().phase
    }

    pub fn target_user_id(&self) -> Option<String> {
        self.state.lock().unwrap().target_user_id.clone()
    }

    pub fn add_listener<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.listeners.add(callback)
    }

    pub fn remove_listener(&self, handle: &ListenerHandle) -> bool {
        self.listeners.remove(handle)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    async fn run(self: Arc<Self>, user_id: String, epoch: u64) {
        let url = format!("{}/{}", self.ws_url, user_id);
        match self.transport.connect(&url).await {
            Ok(mut stream) => {
                info!("通知通道已连接: {}", user_id);
                while let Some(message) = stream.next().await {
                    if !self.is_current(epoch) {
                        return;
                    }
                    match message {
                        Ok(text) => self.deliver(&user_id, &text),
                        Err(e) => {
                            warn!("通道传输错误: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!("通知通道连接失败: {}", e);
            }
        }

        if !self.is_current(epoch) {
            return;
        }
        self.state.lock().unwrap().phase = ConnectionPhase::Closed;
        info!(
            "通知通道已断开, {} 秒后重连",
            self.reconnect_delay.as_secs()
        );
        tokio::time::sleep(self.reconnect_delay).await;
        if self.is_current(epoch) {
            // 用原目标用户重连；重连失败会再次走到这里
            self.connect(&user_id);
        }
    }

    /// 解析并分发一条入站消息；非当前用户的消息直接丢弃
    fn deliver(&self, user_id: &str, raw: &str) {
        let notification: Notification = match serde_json::from_str(raw) {
            Ok(notification) => notification,
            Err(e) => {
                debug!("通知解析失败: {}", e);
                return;
            }
        };
        if notification.user_id != user_id {
            // 用户切换后残留订阅的防御
            debug!("丢弃非当前用户的通知: {}", notification.id);
            return;
        }
        self.inbox.record(notification.clone());
        self.listeners.emit(&notification);
    }
}
