// 本地存储模块
// 封装设备上的键值存储（凭证、用户缓存、当日核验记录）

pub mod keys;
pub mod models;
pub mod operations;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

use crate::error::CoreError;

/// 设备键值存储接口
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove(&self, key: &str) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// 内存实现，用于测试和临时嵌入场景
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

/// 文件实现：JSON 映射落盘，构造时加载，变更时写穿
pub struct FileCredentialStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("本地存储文件损坏，已重置: {}", e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), CoreError> {
        let json = serde_json::to_string(entries)?;
        fs::write(&self.path, json).map_err(|e| CoreError::Store(e.to_string()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        self.persist(&entries)
    }

    fn clear(&self) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.clear();
        self.persist(&entries)
    }
}
