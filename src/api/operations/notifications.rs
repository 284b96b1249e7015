use std::sync::Arc;

use crate::api::AttendanceApi;
use crate::api::models::Notification;
use crate::error::CoreError;
use crate::realtime::inbox::NotificationInbox;

/// 拉取服务端列表并覆盖本地副本
pub async fn refresh(
    api: &Arc<dyn AttendanceApi>,
    inbox: &Arc<NotificationInbox>,
    token: &str,
) -> Result<Vec<Notification>, CoreError> {
    let items = api.notifications(token).await?;
    inbox.replace(items.clone());
    Ok(items)
}

/// 标记已读：先乐观修改本地副本，服务端确认失败时回滚
pub async fn mark_read(
    api: &Arc<dyn AttendanceApi>,
    inbox: &Arc<NotificationInbox>,
    token: &str,
    id: &str,
) -> Result<(), CoreError> {
    let changed = inbox.set_read(id, true);
    match api.mark_notification_read(token, id).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if changed {
                inbox.set_read(id, false);
            }
            Err(e)
        }
    }
}

/// 全部标记已读，失败时恢复先前的副本
pub async fn mark_all_read(
    api: &Arc<dyn AttendanceApi>,
    inbox: &Arc<NotificationInbox>,
    token: &str,
) -> Result<(), CoreError> {
    let previous = inbox.items();
    inbox.set_all_read();
    match api.mark_all_notifications_read(token).await {
        Ok(()) => Ok(()),
        Err(e) => {
            inbox.replace(previous);
            Err(e)
        }
    }
}

/// 删除通知：先移除本地副本，失败时放回
pub async fn delete(
    api: &Arc<dyn AttendanceApi>,
    inbox: &Arc<NotificationInbox>,
    token: &str,
    id: &str,
) -> Result<(), CoreError> {
    let removed = inbox.remove(id);
    match api.delete_notification(token, id).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(notification) = removed {
                inbox.record(notification);
            }
            Err(e)
        }
    }
}
