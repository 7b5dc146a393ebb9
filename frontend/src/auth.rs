//! 认证模块
//!
//! 把核心库的 `SessionStore` 接到 Leptos 的响应式系统上：
//! 会话每次变化都会写入 `session` 信号，路由服务通过注入的信号实现守卫。

use std::rc::Rc;

use clinic_console::{ClinicGateway, ConsoleConfig, ConsoleResult, SessionSnapshot, SessionStore};
use leptos::prelude::*;
use tracing::{info, warn};

use crate::web::{BrowserSessionStorage, FetchHttpClient};

pub type Gateway = ClinicGateway<FetchHttpClient, BrowserSessionStorage>;

/// 控制台上下文
///
/// 通过 Context 在组件间共享；`Copy`，可以直接移入闭包。
#[derive(Clone, Copy)]
pub struct ConsoleContext {
    /// 会话快照（只读）
    pub session: ReadSignal<SessionSnapshot>,
    gateway: StoredValue<Rc<Gateway>, LocalStorage>,
}

impl ConsoleContext {
    /// 创建上下文并从 sessionStorage 恢复会话
    pub fn new(config: ConsoleConfig) -> Self {
        let store = Rc::new(SessionStore::new(
            BrowserSessionStorage,
            config.storage_keys.clone(),
        ));

        let (session, set_session) = signal(SessionSnapshot::default());
        store.subscribe(move |snapshot| set_session.set(snapshot.clone()));
        store.hydrate();

        info!(base_url = %config.base_url, "console context ready");
        let gateway = Rc::new(ClinicGateway::new(config, FetchHttpClient, store));
        Self {
            session,
            gateway: StoredValue::new_local(gateway),
        }
    }

    pub fn gateway(&self) -> Rc<Gateway> {
        self.gateway.get_value()
    }

    /// 会话快照信号（用于路由服务注入）
    pub fn session_signal(&self) -> Signal<SessionSnapshot> {
        self.session.into()
    }

    /// 当前角色名
    pub fn role(&self) -> Signal<Option<String>> {
        let session = self.session;
        Signal::derive(move || session.with(|s| s.role().map(str::to_string)))
    }
}

/// 从 Context 获取控制台上下文
pub fn use_console() -> ConsoleContext {
    use_context::<ConsoleContext>().expect("ConsoleContext should be provided")
}

/// 登录
///
/// 成功后会话信号随之变化，导航由路由服务自动处理。
pub async fn login(ctx: ConsoleContext, username: String, password: String) -> ConsoleResult<()> {
    ctx.gateway().login(&username, &password).await.map(|_| ())
}

/// 注销
///
/// 失败时会话保持不变，错误交给调用方展示。
pub async fn logout(ctx: ConsoleContext) -> ConsoleResult<()> {
    ctx.gateway().logout().await.map(|_| ())
}

/// 无权限页上的退出：服务器注销失败时仍丢弃本地会话
pub async fn sign_out(ctx: ConsoleContext) {
    if let Err(e) = logout(ctx).await {
        warn!(error = %e, "server logout failed, discarding local session");
        ctx.gateway().discard_session();
    }
}
