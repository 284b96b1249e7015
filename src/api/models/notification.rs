// 通知相关数据结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 服务端推送的通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}
