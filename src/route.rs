//! 路由定义与守卫 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义应用的所有路由、访问策略，以及守卫判定函数。

use std::fmt::Display;

use clinic_console_shared::{ROLE_ADMINS, ROLE_SUPER_ADMINS};
use tracing::debug;

use crate::session::SessionSnapshot;

const ALL_STAFF: &[&str] = &[ROLE_SUPER_ADMINS, ROLE_ADMINS];
const SUPER_ADMINS_ONLY: &[&str] = &[ROLE_SUPER_ADMINS];

/// 重定向链的最大跳数
const MAX_REDIRECTS: usize = 4;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    /// 无权访问提示页
    Unauthorized,
    /// 控制面板
    Dashboard,
    AddClinic,
    AddAdmin,
    ShowClinic,
    /// 未匹配的路径
    NotFound,
}

/// 路由的访问策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    /// 需要认证，且角色在允许列表中
    Protected(&'static [&'static str]),
    /// 通配兜底，总是拒绝
    Fallback,
}

/// 守卫判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    DeniedTo(AppRoute),
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        match path {
            "/login" => Self::Login,
            "/unauthorized" => Self::Unauthorized,
            "/dashboard" => Self::Dashboard,
            "/dashboard/add-clinic" => Self::AddClinic,
            "/dashboard/add-admin" => Self::AddAdmin,
            "/dashboard/show-clinic" => Self::ShowClinic,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Unauthorized => "/unauthorized",
            Self::Dashboard => "/dashboard",
            Self::AddClinic => "/dashboard/add-clinic",
            Self::AddAdmin => "/dashboard/add-admin",
            Self::ShowClinic => "/dashboard/show-clinic",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫配置：每个路由的访问策略**
    pub fn policy(&self) -> AccessPolicy {
        match self {
            Self::Login | Self::Unauthorized => AccessPolicy::Public,
            Self::Dashboard | Self::ShowClinic => AccessPolicy::Protected(ALL_STAFF),
            Self::AddClinic | Self::AddAdmin => AccessPolicy::Protected(SUPER_ADMINS_ONLY),
            Self::NotFound => AccessPolicy::Fallback,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self.policy(), AccessPolicy::Public)
    }

    /// 已认证用户访问登录页时的去向
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }

    /// 未认证访问受保护页面时的去向
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 守卫判定：纯函数，不依赖渲染框架
///
/// 只检查角色，不检查权限列表。
pub fn authorize(route: AppRoute, session: &SessionSnapshot) -> Decision {
    match route.policy() {
        AccessPolicy::Public => {
            if route == AppRoute::Login && session.is_authenticated {
                Decision::DeniedTo(AppRoute::auth_success_redirect())
            } else {
                Decision::Allowed
            }
        }
        AccessPolicy::Protected(_) if !session.is_authenticated => {
            Decision::DeniedTo(AppRoute::auth_failure_redirect())
        }
        AccessPolicy::Protected(roles) => {
            let role = session.role().unwrap_or("");
            if roles.iter().any(|allowed| *allowed == role) {
                Decision::Allowed
            } else {
                Decision::DeniedTo(AppRoute::Unauthorized)
            }
        }
        AccessPolicy::Fallback => Decision::DeniedTo(AppRoute::Login),
    }
}

/// 沿重定向链走到最终可显示的路由
///
/// 例如未匹配路径 -> `/login` -> 已登录时 `/dashboard`。
pub fn resolve(route: AppRoute, session: &SessionSnapshot) -> AppRoute {
    let mut current = route;
    for _ in 0..MAX_REDIRECTS {
        match authorize(current, session) {
            Decision::Allowed => return current,
            Decision::DeniedTo(next) => {
                debug!(from = %current, to = %next, "route guard redirect");
                current = next;
            }
        }
    }
    current
}

// ============================================================================
// 侧边栏导航
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub route: AppRoute,
    pub label: &'static str,
}

const SIDEBAR: [NavLink; 4] = [
    NavLink {
        route: AppRoute::Dashboard,
        label: "Dashboard",
    },
    NavLink {
        route: AppRoute::AddClinic,
        label: "Add Clinic",
    },
    NavLink {
        route: AppRoute::AddAdmin,
        label: "Add Admin",
    },
    NavLink {
        route: AppRoute::ShowClinic,
        label: "Clinic",
    },
];

/// 侧边栏链接，`admins` 角色看不到新增诊所/管理员
pub fn sidebar_links(role: Option<&str>) -> Vec<NavLink> {
    SIDEBAR
        .into_iter()
        .filter(|link| {
            !(role == Some(ROLE_ADMINS)
                && matches!(link.route, AppRoute::AddClinic | AppRoute::AddAdmin))
        })
        .collect()
}
