// 远程服务客户端模块
// 只描述接口形状，传输细节对上层不可见

pub mod models;
pub mod operations;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::CoreError;
use models::{
    ApiResponse, AttendanceRecord, EmptyResponse, FaceImageRequest, FaceVerifyResponse,
    LocationUpdateRequest, LocationUpdateResponse, LoginRequest, LoginResponse, Notification,
    User, VerificationRequiredResponse,
};

/// 考勤服务远程接口
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, CoreError>;
    async fn me(&self, token: &str) -> Result<User, CoreError>;
    async fn check_in(
        &self,
        token: &str,
        location: &LocationUpdateRequest,
    ) -> Result<AttendanceRecord, CoreError>;
    async fn check_out(
        &self,
        token: &str,
        location: &LocationUpdateRequest,
    ) -> Result<AttendanceRecord, CoreError>;
    async fn update_location(
        &self,
        token: &str,
        location: &LocationUpdateRequest,
    ) -> Result<LocationUpdateResponse, CoreError>;
    async fn verification_required(
        &self,
        token: &str,
    ) -> Result<VerificationRequiredResponse, CoreError>;
    async fn register_face(
        &self,
        token: &str,
        face_image_data: &str,
    ) -> Result<FaceVerifyResponse, CoreError>;
    async fn verify_face(
        &self,
        token: &str,
        face_image_data: &str,
    ) -> Result<FaceVerifyResponse, CoreError>;
    async fn notifications(&self, token: &str) -> Result<Vec<Notification>, CoreError>;
    async fn mark_notification_read(&self, token: &str, id: &str) -> Result<(), CoreError>;
    async fn mark_all_notifications_read(&self, token: &str) -> Result<(), CoreError>;
    async fn delete_notification(&self, token: &str, id: &str) -> Result<(), CoreError>;
}

/// 基于 reqwest 的实现
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, CoreError> {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::unwrap_response(resp).await
    }

    async fn post<B, T>(&self, token: Option<&str>, path: &str, body: &B) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::unwrap_response(request.send().await?).await
    }

    async fn put_unit(&self, token: &str, path: &str) -> Result<(), CoreError> {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::unwrap_unit(resp).await
    }

    async fn delete_unit(&self, token: &str, path: &str) -> Result<(), CoreError> {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::unwrap_unit(resp).await
    }

    async fn unwrap_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, CoreError> {
        let envelope: ApiResponse<T> = resp.error_for_status()?.json().await?;
        envelope.into_result()
    }

    async fn unwrap_unit(resp: reqwest::Response) -> Result<(), CoreError> {
        let envelope: ApiResponse<EmptyResponse> = resp.error_for_status()?.json().await?;
        envelope.ensure_ok()
    }
}

#[async_trait]
impl AttendanceApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, CoreError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post(None, "/auth/login", &body).await
    }

    async fn me(&self, token: &str) -> Result<User, CoreError> {
        self.get(token, "/auth/me").await
    }

    async fn check_in(
        &self,
        token: &str,
        location: &LocationUpdateRequest,
    ) -> Result<AttendanceRecord, CoreError> {
        self.post(Some(token), "/attendance/check-in", location).await
    }

    async fn check_out(
        &self,
        token: &str,
        location: &LocationUpdateRequest,
    ) -> Result<AttendanceRecord, CoreError> {
        self.post(Some(token), "/attendance/check-out", location).await
    }

    async fn update_location(
        &self,
        token: &str,
        location: &LocationUpdateRequest,
    ) -> Result<LocationUpdateResponse, CoreError> {
        self.post(Some(token), "/location/update", location).await
    }

    async fn verification_required(
        &self,
        token: &str,
    ) -> Result<VerificationRequiredResponse, CoreError> {
        self.get(token, "/face-verification/required").await
    }

    async fn register_face(
        &self,
        token: &str,
        face_image_data: &str,
    ) -> Result<FaceVerifyResponse, CoreError> {
        let body = FaceImageRequest {
            face_image_data: face_image_data.to_string(),
        };
        self.post(Some(token), "/face-verification/register", &body).await
    }

    async fn verify_face(
        &self,
        token: &str,
        face_image_data: &str,
    ) -> Result<FaceVerifyResponse, CoreError> {
        let body = FaceImageRequest {
            face_image_data: face_image_data.to_string(),
        };
        self.post(Some(token), "/face-verification/verify", &body).await
    }

    async fn notifications(&self, token: &str) -> Result<Vec<Notification>, CoreError> {
        self.get(token, "/notifications").await
    }

    async fn mark_notification_read(&self, token: &str, id: &str) -> Result<(), CoreError> {
        self.put_unit(token, &format!("/notifications/{}/read", id)).await
    }

    async fn mark_all_notifications_read(&self, token: &str) -> Result<(), CoreError> {
        self.put_unit(token, "/notifications/read-all").await
    }

    async fn delete_notification(&self, token: &str, id: &str) -> Result<(), CoreError> {
        self.delete_unit(token, &format!("/notifications/{}", id)).await
    }
}
