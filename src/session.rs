//! 会话模块
//!
//! 持有认证令牌与用户资料，并同步写入每个标签页独立的持久化存储。
//! `is_authenticated` 不单独存储，每次读取快照时都由令牌是否存在推导。

use std::cell::{Cell, RefCell};

use clinic_console_shared::UserDetails;
use tracing::{debug, warn};

use crate::config::StorageKeys;
use crate::storage::SessionStorage;

/// 会话快照（只读视图）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserDetails>,
    pub is_authenticated: bool,
}

impl SessionSnapshot {
    /// 当前用户的角色名；没有资料时为 `None`
    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.role_name())
    }
}

#[derive(Default)]
struct Session {
    token: Option<String>,
    user: Option<UserDetails>,
}

type Listener = Box<dyn Fn(&SessionSnapshot)>;

/// 会话存储
///
/// 单线程上下文对象：所有修改同步完成并写穿到存储后才返回。
/// 存储写入失败只记录警告，内存状态在当前标签页生命周期内仍然有效。
pub struct SessionStore<S> {
    storage: S,
    keys: StorageKeys,
    state: RefCell<Session>,
    hydrated: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// 创建空会话；调用 [`hydrate`](Self::hydrate) 之前不读取存储
    pub fn new(storage: S, keys: StorageKeys) -> Self {
        Self {
            storage,
            keys,
            state: RefCell::new(Session::default()),
            hydrated: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// 启动时从存储恢复会话，只执行一次
    ///
    /// 存储为空、不可读或资料 JSON 损坏时回退为 "无会话"（对应部分），从不失败。
    pub fn hydrate(&self) {
        if self.hydrated.replace(true) {
            debug!("session already hydrated, skipping");
            return;
        }

        let mut token = match self.storage.get(&self.keys.token) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read token, starting signed out");
                None
            }
        };

        let user = match self.storage.get(&self.keys.user_details) {
            Ok(Some(raw)) => match serde_json::from_str::<UserDetails>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    // 资料损坏时整个会话作废，令牌一并丢弃
                    warn!(error = %e, "stored user details are corrupt, discarding session");
                    token = None;
                    self.erase(&self.keys.token);
                    self.erase(&self.keys.user_details);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read user details");
                None
            }
        };

        debug!(
            has_token = token.is_some(),
            has_user = user.is_some(),
            "session hydrated"
        );
        *self.state.borrow_mut() = Session { token, user };
        self.notify();
    }

    /// 登录成功后同时写入令牌与资料
    ///
    /// 空令牌视为缺失。
    pub fn set_session(&self, token: String, user: UserDetails) {
        let token = Some(token).filter(|t| !t.is_empty());

        match &token {
            Some(t) => self.write(&self.keys.token, t),
            None => self.erase(&self.keys.token),
        }
        match serde_json::to_string(&user) {
            Ok(json) => self.write(&self.keys.user_details, &json),
            Err(e) => warn!(error = %e, "failed to serialize user details"),
        }

        *self.state.borrow_mut() = Session {
            token,
            user: Some(user),
        };
        self.notify();
    }

    /// 清除令牌；资料可以保留，但受保护路由立即不可达
    pub fn clear_token(&self) {
        self.erase(&self.keys.token);
        self.state.borrow_mut().token = None;
        self.notify();
    }

    /// 清除用户资料
    pub fn clear_profile(&self) {
        self.erase(&self.keys.user_details);
        self.state.borrow_mut().user = None;
        self.notify();
    }

    /// 当前会话快照，无副作用
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.borrow();
        SessionSnapshot {
            token: state.token.clone(),
            user: state.user.clone(),
            is_authenticated: state.token.is_some(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().token.is_some()
    }

    /// 注册会话变化监听器，每次修改后以新快照调用
    ///
    /// 监听器内不能再注册新的监听器。
    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        for listener in self.listeners.borrow().iter() {
            listener(&snapshot);
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!(key, error = %e, "session write failed, keeping in-memory state");
        }
    }

    fn erase(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!(key, error = %e, "session removal failed, keeping in-memory state");
        }
    }
}
