// 监听器注册表
// 会话、考勤、通知三个子系统共用的回调订阅原语

use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// 订阅句柄。即使注册了相同的闭包，句柄也互不相同，移除不会误伤
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerHandle(Uuid);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// 有序监听器集合，按注册顺序同步分发
pub struct ListenerRegistry<T> {
    entries: Mutex<Vec<(ListenerHandle, Callback<T>)>>,
}

impl<T> ListenerRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// 注册监听器，返回可独立移除的句柄
    pub fn add<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let handle = ListenerHandle(Uuid::new_v4());
        self.entries
            .lock()
            .unwrap()
            .push((handle.clone(), Arc::new(callback)));
        handle
    }

    /// 移除监听器；句柄不存在时返回 false
    pub fn remove(&self, handle: &ListenerHandle) -> bool {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(h, _)| h != handle);
        entries.len() != before
    }

    /// 按注册顺序同步分发事件。
    /// 分发基于当前快照：分发过程中新增的监听器不会收到本次事件
    pub fn emit(&self, event: &T) {
        let snapshot: Vec<Callback<T>> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
