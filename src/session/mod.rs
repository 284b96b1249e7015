// 会话生命周期管理
// 通过固定间隔轮询本地凭证判定登录状态。
// 登出只由令牌缺失或过期触发，瞬时接口失败不得终结会话

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::AttendanceApi;
use crate::api::models::{Role, User};
use crate::config::Config;
use crate::error::CoreError;
use crate::infrastructure::auth;
use crate::listeners::{ListenerHandle, ListenerRegistry};
use crate::store::CredentialStore;
use crate::store::operations::CredentialOperations;

/// 客户端会话快照
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub role: Option<Role>,
}

/// 会话状态变更事件
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Authenticated { role: Option<Role> },
    Unauthenticated,
}

struct SessionState {
    current: Option<Session>,
    /// 上次对外通告的事件，用于抑制重复通告
    announced: Option<SessionEvent>,
}

pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    api: Arc<dyn AttendanceApi>,
    poll_interval: Duration,
    state: Mutex<SessionState>,
    listeners: ListenerRegistry<SessionEvent>,
    changed: Notify,
    task: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        api: Arc<dyn AttendanceApi>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            api,
            poll_interval: config.session_poll_interval(),
            state: Mutex::new(SessionState {
                current: None,
                announced: None,
            }),
            listeners: ListenerRegistry::new(),
            changed: Notify::new(),
            task: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// 启动轮询任务；重复调用为空操作
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = this.changed.notified() => {}
                }
                this.poll_once().await;
            }
        });
        *self.task.lock().unwrap() = Some(handle);
    }

    /// 停止轮询；可重复调用
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// 外部已知凭证发生变化时调用，立即触发一次检查而不等下个周期
    pub fn notify_changed(&self) {
        self.changed.notify_one();
    }

    /// 同步读取最近一次判定的会话
    pub fn current_session(&self) -> Option<Session> {
        self.state.lock().unwrap().current.clone()
    }

    pub fn on_event<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.listeners.add(callback)
    }

    pub fn remove_listener(&self, handle: &ListenerHandle) -> bool {
        self.listeners.remove(handle)
    }

    /// 登录并立即刷新会话状态
    pub async fn login(&self, email: &str, password: &str) -> Result<User, CoreError> {
        let resp = self.api.login(email, password).await?;
        CredentialOperations::store_login(&self.store, &resp.token, &resp.user)?;
        self.notify_changed();
        Ok(resp.user)
    }

    /// 退出登录：清空本地凭证并立即重新判定
    pub fn logout(&self) -> Result<(), CoreError> {
        CredentialOperations::clear(&self.store)?;
        self.notify_changed();
        Ok(())
    }

    async fn poll_once(&self) {
        let token = match CredentialOperations::token(&self.store) {
            Ok(token) => token,
            Err(e) => {
                // 存储读取失败不改变会话状态
                warn!("读取令牌失败: {}", e);
                return;
            }
        };

        let Some(token) = token else {
            self.apply(None);
            return;
        };

        let Some(claims) = auth::read_claims(&token) else {
            warn!("令牌无法解析，按已过期处理");
            self.expire();
            return;
        };

        if claims.exp <= Utc::now().timestamp() {
            info!("令牌已过期，触发登出");
            self.expire();
            return;
        }

        let Some(expires_at) = DateTime::<Utc>::from_timestamp(claims.exp, 0) else {
            warn!("令牌过期时间非法，按已过期处理");
            self.expire();
            return;
        };

        let role = self.resolve_role(&token).await;
        self.apply(Some(Session {
            user_id: claims.sub,
            token,
            expires_at,
            role,
        }));
    }

    /// 令牌过期：清空存储并转为未登录
    fn expire(&self) {
        if let Err(e) = CredentialOperations::clear(&self.store) {
            warn!("清空本地凭证失败: {}", e);
        }
        self.apply(None);
    }

    /// 解析角色：优先用缓存的用户信息，缺失时尽力拉取一次用户资料。
    /// 资料拉取失败不是登出信号，保留登录态并把角色置空
    async fn resolve_role(&self, token: &str) -> Option<Role> {
        match CredentialOperations::cached_user(&self.store) {
            Ok(Some(user)) => return Some(user.role),
            Ok(None) => {}
            Err(e) => warn!("读取缓存用户失败: {}", e),
        }

        match self.api.me(token).await {
            Ok(user) => {
                if let Err(e) = CredentialOperations::store_user(&self.store, &user) {
                    warn!("缓存用户信息失败: {}", e);
                }
                Some(user.role)
            }
            Err(e) => {
                debug!("拉取用户资料失败: {}", e);
                None
            }
        }
    }

    /// 写入新状态，仅在 (登录态, 角色) 变化时对外通告
    fn apply(&self, next: Option<Session>) {
        let event = match &next {
            Some(session) => SessionEvent::Authenticated { role: session.role },
            None => SessionEvent::Unauthenticated,
        };
        let should_emit = {
            let mut state = self.state.lock().unwrap();
            state.current = next;
            if state.announced.as_ref() != Some(&event) {
                state.announced = Some(event.clone());
                true
            } else {
                false
            }
        };
        if should_emit {
            match &event {
                SessionEvent::Authenticated { role } => info!("会话已建立, 角色: {:?}", role),
                SessionEvent::Unauthenticated => info!("会话已结束"),
            }
            self.listeners.emit(&event);
        }
    }
}
