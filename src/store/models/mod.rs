// 本地存储数据模型

pub mod verification;

pub use verification::VerificationRecord;
