// 位置采样与自动考勤状态机
// 前台期间按固定间隔采样上报；考勤状态以服务端判定为准，客户端只展示

pub mod locator;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::AttendanceApi;
use crate::api::models::{AttendanceRecord, AttendanceStatus, LocationUpdateRequest};
use crate::config::Config;
use crate::error::CoreError;
use crate::listeners::{ListenerHandle, ListenerRegistry};
use crate::session::SessionManager;
use locator::{LocationSample, Locator, PermissionStatus};

/// 采样循环所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// 未启动
    Idle,
    /// 采样中
    Sampling,
    /// 定位权限被拒，等待用户重新授权
    Unavailable,
}

/// 服务端自动判定签到/签退时产生的一次性提醒
#[derive(Debug, Clone, PartialEq)]
pub struct AutoAttendanceNotice {
    pub status: AttendanceStatus,
    pub message: String,
    pub geofence_name: Option<String>,
}

struct TrackerState {
    phase: TrackerPhase,
    status: AttendanceStatus,
    last_sample: Option<LocationSample>,
    permission_denied: bool,
}

pub struct AttendanceTracker {
    api: Arc<dyn AttendanceApi>,
    locator: Arc<dyn Locator>,
    session: Arc<SessionManager>,
    interval: Duration,
    state: Mutex<TrackerState>,
    notices: ListenerRegistry<AutoAttendanceNotice>,
    /// start/stop 时自增；任务在写回状态前校验代数，
    /// 已被取消的周期不得应用结果
    epoch: AtomicU64,
    in_flight: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// 采样周期在飞标记；Drop 复位，任务被中止时同样释放
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AttendanceTracker {
    pub fn new(
        api: Arc<dyn AttendanceApi>,
        locator: Arc<dyn Locator>,
        session: Arc<SessionManager>,
        config: &Config,
    ) -> Self {
        Self {
            api,
            locator,
            session,
            interval: config.location_interval(),
            state: Mutex::new(TrackerState {
                phase: TrackerPhase::Idle,
                status: AttendanceStatus::AwaitingFirstCheckin,
                last_sample: None,
                permission_denied: false,
            }),
            notices: ListenerRegistry::new(),
            epoch: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    /// 进入前台或登录后调用；采样中重复调用为空操作
    pub fn start(self: &Arc<Self>) {
        {
            let state = self.state.lock().unwrap();
            if state.phase == TrackerPhase::Sampling {
                return;
            }
        }
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run(epoch).await });
        *self.task.lock().unwrap() = Some(handle);
    }

    /// 退到后台或登出时调用；取消定时器，保留最后的考勤状态。可重复调用
    pub fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
        let mut state = self.state.lock().unwrap();
        if state.phase == TrackerPhase::Sampling {
            state.phase = TrackerPhase::Idle;
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        self.state.lock().unwrap().phase
    }

    pub fn current_status(&self) -> AttendanceStatus {
        self.state.lock().unwrap().status
    }

    pub fn last_sample(&self) -> Option<LocationSample> {
        self.state.lock().unwrap().last_sample.clone()
    }

    pub fn on_notice<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&AutoAttendanceNotice) + Send + Sync + 'static,
    {
        self.notices.add(callback)
    }

    pub fn remove_notice_listener(&self, handle: &ListenerHandle) -> bool {
        self.notices.remove(handle)
    }

    async fn run(self: Arc<Self>, epoch: u64) {
        // 权限检查：仅在上次被拒后才重新发起请求
        let denied_before = self.state.lock().unwrap().permission_denied;
        let permission = if denied_before {
            self.locator.request_permission().await
        } else {
            self.locator.permission_status().await
        };

        if permission != PermissionStatus::Granted {
            // 权限被拒后不轮询重试，等用户重新授权
            warn!("定位权限被拒绝，采样循环未启动");
            let mut state = self.state.lock().unwrap();
            if self.epoch.load(Ordering::SeqCst) == epoch {
                state.phase = TrackerPhase::Unavailable;
                state.permission_denied = true;
            }
            return;
        }

        {
            let mut state = self.state.lock().unwrap();
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            state.phase = TrackerPhase::Sampling;
            state.permission_denied = false;
        }
        info!("位置采样循环已启动");

        let mut ticker = tokio::time::interval(self.interval);
        // 周期未结束时落下的 tick 直接丢弃，不排队
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            self.sample_once(epoch).await;
        }
    }

    /// 单次采样-上报周期；任何失败静默跳过，间隔本身就是节流
    async fn sample_once(&self, epoch: u64) {
        let Some(session) = self.session.current_session() else {
            debug!("无有效会话，跳过本次采样");
            return;
        };

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return;
        };

        let sample = match self.locator.current_location().await {
            Ok(sample) => sample,
            Err(e) => {
                debug!("获取定位失败: {}", e);
                return;
            }
        };

        let request = LocationUpdateRequest {
            latitude: sample.latitude,
            longitude: sample.longitude,
            accuracy: sample.accuracy_meters,
        };

        let response = match self.api.update_location(&session.token, &request).await {
            Ok(response) => response,
            Err(e) => {
                debug!("位置上报失败: {}", e);
                return;
            }
        };

        // 已被 stop/start 取代的周期不得写回结果
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return;
        }

        let previous = {
            let mut state = self.state.lock().unwrap();
            let previous = state.status;
            state.status = response.status;
            state.last_sample = Some(sample);
            previous
        };

        if response.status.is_auto() && response.status != previous {
            info!(
                "服务端自动考勤: {:?} @ {:?}",
                response.status, response.geofence_name
            );
            self.notices.emit(&AutoAttendanceNotice {
                status: response.status,
                message: response.message,
                geofence_name: response.geofence_name,
            });
        }
    }

    /// 手动签到；失败直接上抛给调用方展示
    pub async fn check_in(&self) -> Result<AttendanceRecord, CoreError> {
        let (token, request) = self.manual_request().await?;
        let record = self.api.check_in(&token, &request).await?;
        self.state.lock().unwrap().status = record.status;
        Ok(record)
    }

    /// 手动签退；失败直接上抛给调用方展示
    pub async fn check_out(&self) -> Result<AttendanceRecord, CoreError> {
        let (token, request) = self.manual_request().await?;
        let record = self.api.check_out(&token, &request).await?;
        self.state.lock().unwrap().status = record.status;
        Ok(record)
    }

    async fn manual_request(&self) -> Result<(String, LocationUpdateRequest), CoreError> {
        let session = self
            .session
            .current_session()
            .ok_or(CoreError::Unauthorized)?;
        let sample = self.locator.current_location().await?;
        let request = LocationUpdateRequest {
            latitude: sample.latitude,
            longitude: sample.longitude,
            accuracy: sample.accuracy_meters,
        };
        self.state.lock().unwrap().last_sample = Some(sample);
        Ok((session.token, request))
    }
}
