//! 诊所管理控制台的核心逻辑
//!
//! 与渲染无关：会话存储、路由守卫与远程数据网关都可以在原生环境下测试，
//! 浏览器端（frontend crate）只负责把它们接到 DOM 上。

pub mod config;
pub mod error;
pub mod gateway;
pub mod request;
pub mod route;
pub mod session;
pub mod storage;

pub use config::{ConsoleConfig, StorageKeys};
pub use error::{ConsoleError, ConsoleResult, ErrorStatus};
pub use gateway::{ClinicGateway, LoginSuccess, RequestState};
pub use request::{HttpClient, HttpRequest, HttpResponse};
pub use route::{AppRoute, Decision, NavLink, authorize, resolve, sidebar_links};
pub use session::{SessionSnapshot, SessionStore};
pub use storage::{MemoryStorage, SessionStorage, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use request::ReqwestHttpClient;
