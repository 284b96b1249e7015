use std::sync::Mutex;

use crate::api::models::Notification;

/// 已送达通知的本地副本。
/// 只有 isRead 这类展示字段做乐观修改，以服务端确认为准
#[derive(Default)]
pub struct NotificationInbox {
    items: Mutex<Vec<Notification>>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条通知；同 id 覆盖，新通知排在最前
    pub fn record(&self, notification: Notification) {
        let mut items = self.items.lock().unwrap();
        items.retain(|n| n.id != notification.id);
        items.insert(0, notification);
    }

    pub fn items(&self) -> Vec<Notification> {
        self.items.lock().unwrap().clone()
    }

    /// 以服务端列表覆盖本地副本
    pub fn replace(&self, items: Vec<Notification>) {
        *self.items.lock().unwrap() = items;
    }

    /// 修改单条已读标记；实际发生修改时返回 true
    pub fn set_read(&self, id: &str, read: bool) -> bool {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|n| n.id == id) {
            Some(n) if n.is_read != read => {
                n.is_read = read;
                true
            }
            _ => false,
        }
    }

    pub fn set_all_read(&self) {
        for n in self.items.lock().unwrap().iter_mut() {
            n.is_read = true;
        }
    }

    pub fn remove(&self, id: &str) -> Option<Notification> {
        let mut items = self.items.lock().unwrap();
        let index = items.iter().position(|n| n.id == id)?;
        Some(items.remove(index))
    }

    pub fn unread_count(&self) -> usize {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|n| !n.is_read)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pushed_notification;

    #[test]
    fn newest_first_and_dedup_by_id() {
        let inbox = NotificationInbox::new();
        inbox.record(pushed_notification("n-1", "u-1"));
        inbox.record(pushed_notification("n-2", "u-1"));
        // 同 id 再次送达时覆盖旧副本
        inbox.record(pushed_notification("n-1", "u-1"));

        let items = inbox.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "n-1");
        assert_eq!(items[1].id, "n-2");
    }

    #[test]
    fn read_flags_and_counts() {
        let inbox = NotificationInbox::new();
        inbox.record(pushed_notification("n-1", "u-1"));
        inbox.record(pushed_notification("n-2", "u-1"));
        assert_eq!(inbox.unread_count(), 2);

        assert!(inbox.set_read("n-1", true));
        assert!(!inbox.set_read("n-1", true));
        assert!(!inbox.set_read("missing", true));
        assert_eq!(inbox.unread_count(), 1);

        inbox.set_all_read();
        assert_eq!(inbox.unread_count(), 0);
    }

    #[test]
    fn remove_returns_the_copy() {
        let inbox = NotificationInbox::new();
        inbox.record(pushed_notification("n-1", "u-1"));

        let removed = inbox.remove("n-1").unwrap();
        assert_eq!(removed.id, "n-1");
        assert!(inbox.items().is_empty());
        assert!(inbox.remove("n-1").is_none());
    }
}
