// 本地存储操作

pub mod credentials;
pub mod verification;

// 重新导出常用操作
pub use credentials::CredentialOperations;
pub use verification::VerificationCacheOperations;
