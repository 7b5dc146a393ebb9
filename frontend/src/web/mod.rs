//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装，
//! 把核心库的存储与 HTTP 接口落到 `web_sys` 上。

mod http;
pub mod router;
mod storage;

pub use http::FetchHttpClient;
pub use storage::BrowserSessionStorage;
