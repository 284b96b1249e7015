// API 数据传输对象模块
// 包含与服务端交互的数据结构

pub mod attendance;
pub mod auth;
pub mod common;
pub mod notification;
pub mod user;
pub mod verification;

// 重新导出常用类型
pub use attendance::*;
pub use auth::*;
pub use common::*;
pub use notification::*;
pub use user::*;
pub use verification::*;
