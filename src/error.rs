use thiserror::Error;

/// 客户端核心统一错误类型
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("网络请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("接口返回错误({code}): {message}")]
    Api { code: i32, message: String },

    #[error("数据解析失败: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("本地存储错误: {0}")]
    Store(String),

    #[error("未登录或会话已过期")]
    Unauthorized,

    #[error("定位权限被拒绝")]
    PermissionDenied,

    #[error("获取定位失败: {0}")]
    Location(String),

    #[error("通道传输错误: {0}")]
    Transport(String),
}
