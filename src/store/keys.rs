/// 存储键定义

/// 访问令牌
pub const AUTH_TOKEN: &str = "auth_token";

/// 缓存的用户信息
pub const CACHED_USER: &str = "cached_user";

/// 当日人脸核验记录
pub const FACE_VERIFICATION: &str = "face_verification";
