// 考勤相关数据结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::Location;

/// 考勤状态。判定在服务端完成，客户端只持有最近一次返回值用于展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    CheckedIn,
    CheckedOut,
    AutoCheckedIn,
    AutoCheckedOut,
    AwaitingFirstCheckin,
    Absent,
    Outside,
    /// 未知状态统一归入错误
    #[serde(other)]
    Error,
}

impl AttendanceStatus {
    /// 是否为服务端自动判定的状态
    pub fn is_auto(self) -> bool {
        matches!(
            self,
            AttendanceStatus::AutoCheckedIn | AttendanceStatus::AutoCheckedOut
        )
    }
}

/// 位置上报请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationUpdateRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

/// 位置上报响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateResponse {
    pub status: AttendanceStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofence_name: Option<String>,
}

/// 考勤记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<Location>,
}
