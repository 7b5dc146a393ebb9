//! 诊所管理控制台前端
//!
//! 采用 Context-Driven 的架构：
//! - 核心库 `clinic_console`: 会话、路由守卫、数据网关（与 DOM 无关）
//! - `web`: 浏览器适配（sessionStorage、fetch、History 路由服务）
//! - `auth`: 把会话接入响应式系统
//! - `components`: UI 组件层

mod auth;
mod components {
    pub mod add_admin;
    pub mod add_clinic;
    mod clinic_form;
    pub mod dashboard;
    mod field;
    mod layout;
    pub mod login;
    mod notice;
    mod permissions_dialog;
    pub mod show_clinic;
    pub mod unauthorized;
}
pub(crate) mod web;

use clinic_console::{AppRoute, ConsoleConfig};
use leptos::prelude::*;

use crate::auth::ConsoleContext;
use crate::components::add_admin::AddAdminPage;
use crate::components::add_clinic::AddClinicPage;
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::show_clinic::ShowClinicPage;
use crate::components::unauthorized::UnauthorizedPage;
use crate::web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 守卫已经在路由服务中执行，这里只负责把路由映射到页面。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Unauthorized => view! { <UnauthorizedPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::AddClinic => view! { <AddClinicPage /> }.into_any(),
        AppRoute::AddAdmin => view! { <AddAdminPage /> }.into_any(),
        AppRoute::ShowClinic => view! { <ShowClinicPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建上下文（同时从 sessionStorage 恢复会话）
    let ctx = ConsoleContext::new(ConsoleConfig::default());
    provide_context(ctx);

    // 2. 会话信号注入路由服务
    let session = ctx.session_signal();

    view! {
        <Router session=session>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
