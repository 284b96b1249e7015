use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// 访问令牌中的声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户ID
    pub exp: i64,    // 过期时间
    #[serde(default)]
    pub iat: i64, // 签发时间
}

/// 本地解析令牌声明。
/// 客户端不持有签名密钥，跳过签名校验只读取声明内容，
/// 有效性以 exp 与本地时钟比较为准，不做网络调用。
pub fn read_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

/// 令牌是否已过期（无法解析视为过期）
pub fn is_expired(token: &str) -> bool {
    match read_claims(token) {
        Some(claims) => claims.exp <= Utc::now().timestamp(),
        None => true,
    }
}
