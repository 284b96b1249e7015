use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreError;

/// 定位权限状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// 一次定位采样。只保留最近一次用于展示，上报后即丢弃
#[derive(Debug, Clone)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
    pub captured_at: DateTime<Utc>,
}

/// 设备定位接口
#[async_trait]
pub trait Locator: Send + Sync {
    /// 当前权限状态
    async fn permission_status(&self) -> PermissionStatus;
    /// 向用户重新请求权限
    async fn request_permission(&self) -> PermissionStatus;
    /// 获取一次定位
    async fn current_location(&self) -> Result<LocationSample, CoreError>;
}

/// 固定坐标实现，用于部署在固定位置的考勤终端
pub struct FixedLocator {
    latitude: f64,
    longitude: f64,
    accuracy_meters: f64,
}

impl FixedLocator {
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters,
        }
    }
}

#[async_trait]
impl Locator for FixedLocator {
    async fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_location(&self) -> Result<LocationSample, CoreError> {
        Ok(LocationSample {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy_meters: self.accuracy_meters,
            captured_at: Utc::now(),
        })
    }
}
