use std::sync::Arc;

use tracing::warn;

use crate::error::CoreError;
use crate::store::models::VerificationRecord;
use crate::store::{CredentialStore, keys};

/// 当日人脸核验缓存操作
pub struct VerificationCacheOperations;

impl VerificationCacheOperations {
    /// 读取当日核验状态；过期记录、解析失败或存储错误均按缓存未命中处理
    pub fn today_status(store: &Arc<dyn CredentialStore>) -> Option<VerificationRecord> {
        let raw = match store.get(keys::FACE_VERIFICATION) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("读取核验记录失败: {}", e);
                return None;
            }
        };
        let record: VerificationRecord = serde_json::from_str(&raw).ok()?;
        record.is_today().then_some(record)
    }

    /// 写入当日核验结果，覆盖旧记录
    pub fn set_verified(
        store: &Arc<dyn CredentialStore>,
        registered: bool,
    ) -> Result<VerificationRecord, CoreError> {
        let record = VerificationRecord::today(true, registered);
        let json = serde_json::to_string(&record)?;
        store.set(keys::FACE_VERIFICATION, &json)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCredentialStore;
    use chrono::{Days, Local};

    #[test]
    fn set_then_get_same_day() {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        assert!(VerificationCacheOperations::today_status(&store).is_none());

        VerificationCacheOperations::set_verified(&store, true).unwrap();
        let record = VerificationCacheOperations::today_status(&store).unwrap();
        assert!(record.verified);
        assert!(record.registered);
    }

    #[test]
    fn stale_record_reads_as_miss() {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        let yesterday = VerificationRecord {
            date: Local::now()
                .date_naive()
                .checked_sub_days(Days::new(1))
                .unwrap(),
            verified: true,
            registered: true,
        };
        store
            .set(
                keys::FACE_VERIFICATION,
                &serde_json::to_string(&yesterday).unwrap(),
            )
            .unwrap();

        // 日期翻转后旧记录不再生效
        assert!(VerificationCacheOperations::today_status(&store).is_none());
    }

    #[test]
    fn overwrite_replaces_previous_record() {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        VerificationCacheOperations::set_verified(&store, false).unwrap();
        let record = VerificationCacheOperations::set_verified(&store, true).unwrap();
        assert!(record.registered);

        let read = VerificationCacheOperations::today_status(&store).unwrap();
        assert_eq!(read, record);
    }
}
