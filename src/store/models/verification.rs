use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// 人脸核验记录，按自然日生效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub date: NaiveDate,
    pub verified: bool,
    pub registered: bool,
}

impl VerificationRecord {
    /// 以今天为生效日期创建记录
    pub fn today(verified: bool, registered: bool) -> Self {
        Self {
            date: Local::now().date_naive(),
            verified,
            registered,
        }
    }

    /// 记录日期不是今天即视为失效
    pub fn is_today(&self) -> bool {
        self.date == Local::now().date_naive()
    }
}
