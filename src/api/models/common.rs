// 通用的数据结构定义

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 通用的API响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 错误码，0表示成功，非0表示失败
    pub code: i32,
    /// 错误消息，成功时为"success"
    pub msg: String,
    /// 响应数据，错误时为None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 解包响应：code 为 0 时取出数据，否则转换为接口错误
    pub fn into_result(self) -> Result<T, CoreError> {
        if self.code == 0 {
            self.resp_data.ok_or(CoreError::Api {
                code: self.code,
                message: "响应数据缺失".to_string(),
            })
        } else {
            Err(CoreError::Api {
                code: self.code,
                message: self.msg,
            })
        }
    }

    /// 只校验错误码，忽略数据（用于无响应体的接口）
    pub fn ensure_ok(self) -> Result<(), CoreError> {
        if self.code == 0 {
            Ok(())
        } else {
            Err(CoreError::Api {
                code: self.code,
                message: self.msg,
            })
        }
    }
}

/// 空响应类型（用于无响应数据的API）
#[derive(Debug, Serialize, Deserialize)]
pub struct EmptyResponse {}

/// 位置信息
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Location {
    /// 纬度
    pub latitude: f64,
    /// 经度
    pub longitude: f64,
}
