use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub ws_url: String,
    pub store_path: String,
    pub session_poll_interval_ms: u64,
    pub location_interval_secs: u64,
    pub reconnect_delay_secs: u64,
    pub request_timeout_secs: u64,
    /// 核验接口不可达时是否放行（产品决策：默认放行）
    pub verification_fail_open: bool,
    pub device_latitude: f64,
    pub device_longitude: f64,
    pub device_accuracy_meters: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")?;
        // 未单独配置时由 API 地址推导通知通道地址
        let ws_url = env::var("WS_URL").unwrap_or_else(|_| {
            format!(
                "{}/ws/notifications",
                api_base_url
                    .replacen("https://", "wss://", 1)
                    .replacen("http://", "ws://", 1)
            )
        });

        Ok(Config {
            api_base_url,
            ws_url,
            store_path: env::var("STORE_PATH").unwrap_or_else(|_| "attendance_store.json".into()),
            session_poll_interval_ms: env::var("SESSION_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            location_interval_secs: env::var("LOCATION_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            reconnect_delay_secs: env::var("RECONNECT_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            verification_fail_open: env::var("VERIFICATION_FAIL_OPEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            device_latitude: env::var("DEVICE_LATITUDE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
            device_longitude: env::var("DEVICE_LONGITUDE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
            device_accuracy_meters: env::var("DEVICE_ACCURACY_METERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10.0),
        })
    }

    pub fn session_poll_interval(&self) -> Duration {
        Duration::from_millis(self.session_poll_interval_ms)
    }

    pub fn location_interval(&self) -> Duration {
        Duration::from_secs(self.location_interval_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
