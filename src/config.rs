//! 运行时配置
//!
//! 默认值可在构建时通过 `CLINIC_CONSOLE_API_URL` 覆盖；
//! 原生环境下 `from_env` 还会读取运行时环境变量。

use clinic_console_shared::ADMIN_ROLE_ID;

const FALLBACK_BASE_URL: &str = "https://medical-clinic.serv00.net/api";
const DEFAULT_TOKEN_KEY: &str = "token";
const DEFAULT_USER_DETAILS_KEY: &str = "userDetails";

/// Keys under which the session is persisted in per-tab storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub token: String,
    pub user_details: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN_KEY.to_string(),
            user_details: DEFAULT_USER_DETAILS_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// API 根地址，不带结尾的 `/`
    pub base_url: String,
    pub storage_keys: StorageKeys,
    /// `GET /actor/{role_id}` 列出管理员时使用的角色 id
    pub admin_role_id: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(option_env!("CLINIC_CONSOLE_API_URL").unwrap_or(FALLBACK_BASE_URL))
    }
}

impl ConsoleConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            storage_keys: StorageKeys::default(),
            admin_role_id: ADMIN_ROLE_ID,
        }
    }

    /// 从环境变量读取配置，读不到或无法解析时使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup("CLINIC_CONSOLE_API_URL") {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        };
        if let Some(key) = lookup("CLINIC_CONSOLE_TOKEN_KEY") {
            config.storage_keys.token = key;
        }
        if let Some(key) = lookup("CLINIC_CONSOLE_USER_KEY") {
            config.storage_keys.user_details = key;
        }
        if let Some(id) = lookup("CLINIC_CONSOLE_ADMIN_ROLE_ID").and_then(|v| v.parse().ok()) {
            config.admin_role_id = id;
        }
        config
    }

    /// 拼接完整 URL，保证中间只有一个 `/`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
