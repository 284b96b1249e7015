// 测试用的假协作方实现
// 各子系统单测通过注入这些实现来驱动时序和故障场景

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream;
use jsonwebtoken::{EncodingKey, Header, encode};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

use crate::api::AttendanceApi;
use crate::api::models::{
    AttendanceRecord, AttendanceStatus, FaceVerifyResponse, LocationUpdateRequest,
    LocationUpdateResponse, LoginResponse, Notification, Role, User,
    VerificationRequiredResponse,
};
use crate::attendance::locator::{LocationSample, Locator, PermissionStatus};
use crate::config::Config;
use crate::error::CoreError;
use crate::infrastructure::auth::Claims;
use crate::realtime::transport::{ChannelTransport, MessageStream};

pub fn test_config() -> Config {
    Config {
        api_base_url: "http://localhost:0".into(),
        ws_url: "ws://localhost:0/ws/notifications".into(),
        store_path: "unused".into(),
        session_poll_interval_ms: 100,
        location_interval_secs: 30,
        reconnect_delay_secs: 5,
        request_timeout_secs: 10,
        verification_fail_open: true,
        device_latitude: 31.2304,
        device_longitude: 121.4737,
        device_accuracy_meters: 10.0,
    }
}

pub fn test_user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: "张三".into(),
        email: "zhangsan@example.com".into(),
        role: Role::Employee,
        department: Some("研发部".into()),
    }
}

/// 生成带指定过期时间的令牌；客户端侧不校验签名，密钥随意
pub fn make_token(user_id: &str, expires_in_secs: i64) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: Utc::now().timestamp() + expires_in_secs,
        iat: Utc::now().timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

fn transient_error() -> CoreError {
    CoreError::Api {
        code: 5000,
        message: "模拟网络故障".into(),
    }
}

/// 可编程的远程服务假实现
pub struct FakeApi {
    pub login_response: Mutex<Option<LoginResponse>>,
    /// None 表示 /auth/me 返回瞬时错误
    pub me_user: Mutex<Option<User>>,
    pub me_calls: AtomicUsize,
    /// None 表示位置上报返回瞬时错误
    pub location_response: Mutex<Option<LocationUpdateResponse>>,
    pub location_calls: AtomicUsize,
    /// 模拟慢请求，用虚拟时间拉长单个周期
    pub location_delay: Mutex<Option<Duration>>,
    pub check_in_record: Mutex<Option<AttendanceRecord>>,
    pub verification_response: Mutex<Option<VerificationRequiredResponse>>,
    pub face_verify_response: Mutex<Option<FaceVerifyResponse>>,
    pub mark_read_fails: AtomicBool,
    pub delete_fails: AtomicBool,
    pub notifications_list: Mutex<Vec<Notification>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            login_response: Mutex::new(None),
            me_user: Mutex::new(None),
            me_calls: AtomicUsize::new(0),
            location_response: Mutex::new(None),
            location_calls: AtomicUsize::new(0),
            location_delay: Mutex::new(None),
            check_in_record: Mutex::new(None),
            verification_response: Mutex::new(None),
            face_verify_response: Mutex::new(None),
            mark_read_fails: AtomicBool::new(false),
            delete_fails: AtomicBool::new(false),
            notifications_list: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn gauge(&self) -> GaugeGuard<'_> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        GaugeGuard(&self.in_flight)
    }
}

/// 并发计数的 RAII 守卫；周期被中止时同样归零
struct GaugeGuard<'a>(&'a AtomicUsize);

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AttendanceApi for FakeApi {
    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, CoreError> {
        match self.login_response.lock().unwrap().take() {
            Some(resp) => Ok(resp),
            None => Err(transient_error()),
        }
    }

    async fn me(&self, _token: &str) -> Result<User, CoreError> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        match self.me_user.lock().unwrap().clone() {
            Some(user) => Ok(user),
            None => Err(transient_error()),
        }
    }

    async fn check_in(
        &self,
        _token: &str,
        _location: &LocationUpdateRequest,
    ) -> Result<AttendanceRecord, CoreError> {
        match self.check_in_record.lock().unwrap().clone() {
            Some(record) => Ok(record),
            None => Err(transient_error()),
        }
    }

    async fn check_out(
        &self,
        _token: &str,
        _location: &LocationUpdateRequest,
    ) -> Result<AttendanceRecord, CoreError> {
        match self.check_in_record.lock().unwrap().clone() {
            Some(record) => Ok(record),
            None => Err(transient_error()),
        }
    }

    async fn update_location(
        &self,
        _token: &str,
        _location: &LocationUpdateRequest,
    ) -> Result<LocationUpdateResponse, CoreError> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        let _gauge = self.gauge();
        let delay = *self.location_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.location_response.lock().unwrap().clone() {
            Some(resp) => Ok(resp),
            None => Err(transient_error()),
        }
    }

    async fn verification_required(
        &self,
        _token: &str,
    ) -> Result<VerificationRequiredResponse, CoreError> {
        match self.verification_response.lock().unwrap().clone() {
            Some(resp) => Ok(resp),
            None => Err(transient_error()),
        }
    }

    async fn register_face(
        &self,
        _token: &str,
        _face_image_data: &str,
    ) -> Result<FaceVerifyResponse, CoreError> {
        match self.face_verify_response.lock().unwrap().clone() {
            Some(resp) => Ok(resp),
            None => Err(transient_error()),
        }
    }

    async fn verify_face(
        &self,
        _token: &str,
        _face_image_data: &str,
    ) -> Result<FaceVerifyResponse, CoreError> {
        match self.face_verify_response.lock().unwrap().clone() {
            Some(resp) => Ok(resp),
            None => Err(transient_error()),
        }
    }

    async fn notifications(&self, _token: &str) -> Result<Vec<Notification>, CoreError> {
        Ok(self.notifications_list.lock().unwrap().clone())
    }

    async fn mark_notification_read(&self, _token: &str, _id: &str) -> Result<(), CoreError> {
        if self.mark_read_fails.load(Ordering::SeqCst) {
            Err(transient_error())
        } else {
            Ok(())
        }
    }

    async fn mark_all_notifications_read(&self, _token: &str) -> Result<(), CoreError> {
        if self.mark_read_fails.load(Ordering::SeqCst) {
            Err(transient_error())
        } else {
            Ok(())
        }
    }

    async fn delete_notification(&self, _token: &str, _id: &str) -> Result<(), CoreError> {
        if self.delete_fails.load(Ordering::SeqCst) {
            Err(transient_error())
        } else {
            Ok(())
        }
    }
}

/// 可编程的定位假实现
pub struct FakeLocator {
    pub permission: Mutex<PermissionStatus>,
    /// request_permission 时授予权限（模拟用户点了允许）
    pub grant_on_request: AtomicBool,
    pub status_calls: AtomicUsize,
    pub request_calls: AtomicUsize,
    pub location_fails: AtomicBool,
}

impl Default for FakeLocator {
    fn default() -> Self {
        Self {
            permission: Mutex::new(PermissionStatus::Granted),
            grant_on_request: AtomicBool::new(false),
            status_calls: AtomicUsize::new(0),
            request_calls: AtomicUsize::new(0),
            location_fails: AtomicBool::new(false),
        }
    }
}

impl FakeLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denied() -> Self {
        let locator = Self::default();
        *locator.permission.lock().unwrap() = PermissionStatus::Denied;
        locator
    }
}

#[async_trait]
impl Locator for FakeLocator {
    async fn permission_status(&self) -> PermissionStatus {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> PermissionStatus {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        if self.grant_on_request.load(Ordering::SeqCst) {
            *self.permission.lock().unwrap() = PermissionStatus::Granted;
        }
        *self.permission.lock().unwrap()
    }

    async fn current_location(&self) -> Result<LocationSample, CoreError> {
        if self.location_fails.load(Ordering::SeqCst) {
            return Err(CoreError::Location("模拟定位失败".into()));
        }
        Ok(LocationSample {
            latitude: 31.2304,
            longitude: 121.4737,
            accuracy_meters: 5.0,
            captured_at: Utc::now(),
        })
    }
}

/// 可编程的通道传输假实现：每次 connect 产出一条可外部灌入消息的流
#[derive(Default)]
pub struct FakeTransport {
    pub connect_calls: AtomicUsize,
    pub fail_next_connect: AtomicBool,
    pub urls: Mutex<Vec<String>>,
    pub senders: Mutex<Vec<UnboundedSender<Result<String, CoreError>>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 向第 index 条连接灌入一条文本消息
    pub fn push(&self, index: usize, text: &str) {
        self.senders.lock().unwrap()[index]
            .send(Ok(text.to_string()))
            .unwrap();
    }

    /// 向第 index 条连接注入一个传输错误
    pub fn fail(&self, index: usize) {
        self.senders.lock().unwrap()[index]
            .send(Err(CoreError::Transport("模拟断线".into())))
            .unwrap();
    }
}

#[async_trait]
impl ChannelTransport for FakeTransport {
    async fn connect(&self, url: &str) -> Result<MessageStream, CoreError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail_next_connect.swap(false, Ordering::SeqCst) {
            return Err(CoreError::Transport("模拟连接失败".into()));
        }
        let (tx, rx) = unbounded_channel();
        self.senders.lock().unwrap().push(tx);
        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }
}

pub fn auto_checked_in(geofence: &str) -> LocationUpdateResponse {
    LocationUpdateResponse {
        status: AttendanceStatus::AutoCheckedIn,
        message: format!("已进入 {} 围栏，自动签到", geofence),
        geofence_name: Some(geofence.to_string()),
    }
}

pub fn pushed_notification(id: &str, user_id: &str) -> Notification {
    Notification {
        id: id.to_string(),
        user_id: user_id.to_string(),
        kind: "ANNOUNCEMENT".into(),
        title: "通知".into(),
        message: "测试消息".into(),
        is_read: false,
        timestamp: Utc::now(),
    }
}
