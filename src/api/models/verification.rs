// 人脸核验相关数据结构

use serde::{Deserialize, Serialize};

/// 核验状态查询响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequiredResponse {
    pub face_registered: bool,
    pub verified_today: bool,
}

/// 人脸注册/核验请求
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceImageRequest {
    pub face_image_data: String,
}

/// 人脸注册/核验响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceVerifyResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}
