/// Liveness bound for session initialization.
pub const DEFAULT_INIT_TIMEOUT_MS: u64 = 15_000;
/// Automatic re-attempts of construction + probe before surfacing an error.
pub const DEFAULT_CONNECT_RETRY_LIMIT: u32 = 2;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub init_timeout_ms: u64,
    pub connect_retry_limit: u32,
    pub retry_base_delay_ms: u64,

    /// Secret passed to the access-control probe. May be empty.
    pub admin_token: String,

    /// Principal used by the headless session driver (may be empty).
    pub principal: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: DEFAULT_INIT_TIMEOUT_MS,
            connect_retry_limit: DEFAULT_CONNECT_RETRY_LIMIT,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            admin_token: String::new(),
            principal: String::new(),
        }
    }
}

impl AppConfig {
    /// Create AppConfig from TOML value
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let session = toml_value.get("session");
        let integer = |key: &str| {
            session
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
                .filter(|v| *v >= 0)
        };

        Ok(Self {
            init_timeout_ms: integer("init_timeout_ms")
                .map(|v| v as u64)
                .unwrap_or(DEFAULT_INIT_TIMEOUT_MS),
            connect_retry_limit: integer("connect_retry_limit")
                .map(|v| v.min(u32::MAX as i64) as u32)
                .unwrap_or(DEFAULT_CONNECT_RETRY_LIMIT),
            retry_base_delay_ms: integer("retry_base_delay_ms")
                .map(|v| v as u64)
                .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
            admin_token: toml_value
                .get("backend")
                .and_then(|b| b.get("admin_token"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            principal: toml_value
                .get("identity")
                .and_then(|i| i.get("principal"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
        })
    }
}
