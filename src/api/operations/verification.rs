use std::sync::Arc;

use tracing::warn;

use crate::api::AttendanceApi;
use crate::api::models::FaceVerifyResponse;
use crate::error::CoreError;
use crate::store::CredentialStore;
use crate::store::models::VerificationRecord;
use crate::store::operations::VerificationCacheOperations;

/// 查询当日核验状态，优先走本地缓存。
/// 远程不可达时按配置降级：fail_open 为 true 时放行本次会话，且不落缓存
pub async fn ensure_today(
    api: &Arc<dyn AttendanceApi>,
    store: &Arc<dyn CredentialStore>,
    token: &str,
    fail_open: bool,
) -> Result<VerificationRecord, CoreError> {
    if let Some(record) = VerificationCacheOperations::today_status(store) {
        return Ok(record);
    }

    match api.verification_required(token).await {
        Ok(resp) => {
            if resp.verified_today {
                return VerificationCacheOperations::set_verified(store, resp.face_registered);
            }
            Ok(VerificationRecord::today(false, resp.face_registered))
        }
        Err(e) if fail_open => {
            warn!("核验状态查询失败，本次放行: {}", e);
            Ok(VerificationRecord::today(true, true))
        }
        Err(e) => Err(e),
    }
}

/// 人脸核验，成功后写入当日缓存
pub async fn verify_face(
    api: &Arc<dyn AttendanceApi>,
    store: &Arc<dyn CredentialStore>,
    token: &str,
    face_image_data: &str,
) -> Result<FaceVerifyResponse, CoreError> {
    let resp = api.verify_face(token, face_image_data).await?;
    if resp.success {
        VerificationCacheOperations::set_verified(store, true)?;
    }
    Ok(resp)
}

/// 人脸注册；注册成功当日视同已核验
pub async fn register_face(
    api: &Arc<dyn AttendanceApi>,
    store: &Arc<dyn CredentialStore>,
    token: &str,
    face_image_data: &str,
) -> Result<FaceVerifyResponse, CoreError> {
    let resp = api.register_face(token, face_image_data).await?;
    if resp.success {
        VerificationCacheOperations::set_verified(store, true)?;
    }
    Ok(resp)
}
