//! SessionStorage 封装模块
//!
//! 使用 `web_sys::Storage` 实现会话持久化：每个标签页独立，刷新后仍然保留。

use clinic_console::{SessionStorage, StorageError};

/// 浏览器 `window.sessionStorage`
#[derive(Clone, Copy, Default)]
pub struct BrowserSessionStorage;

impl BrowserSessionStorage {
    /// 获取 SessionStorage 实例
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("无法获取 window 对象".to_string()))?;
        window
            .session_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("sessionStorage 已被禁用".to_string()))
    }
}

impl SessionStorage for BrowserSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }
}
