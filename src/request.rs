use std::collections::HashMap;

use clinic_console_shared::protocol::{HttpMethod, RequestBody};

use crate::error::ConsoleResult;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 客户端特性 (Trait)
/// (?Send) 是因为浏览器环境下 fetch 相关类型不是 Send 的
///
/// 只有传输失败（没有拿到响应）才返回 `Err`，且必须是 `ErrorStatus::Network`；
/// 非 2xx 响应照常返回，由调用方分类。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> ConsoleResult<HttpResponse>;
}

// =========================================================
// 实现层: reqwest 客户端 (原生环境)
// =========================================================

#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestHttpClient;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::{HttpClient, HttpRequest, HttpResponse};
    use crate::error::{ConsoleError, ConsoleResult};
    use clinic_console_shared::protocol::{FormValue, HttpMethod, RequestBody};
    use reqwest::multipart::{Form, Part};

    #[derive(Clone, Default)]
    pub struct ReqwestHttpClient {
        client: reqwest::Client,
    }

    impl ReqwestHttpClient {
        pub fn new() -> Self {
            Self {
                client: reqwest::Client::new(),
            }
        }
    }

    fn multipart(fields: Vec<clinic_console_shared::protocol::FormField>) -> ConsoleResult<Form> {
        let mut form = Form::new();
        for field in fields {
            form = match field.value {
                FormValue::Text(text) => form.text(field.name, text),
                FormValue::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&content_type)
                        .map_err(|e| ConsoleError::validation(format!("bad content type: {}", e)))?;
                    form.part(field.name, part)
                }
            };
        }
        Ok(form)
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for ReqwestHttpClient {
        async fn send(&self, req: HttpRequest) -> ConsoleResult<HttpResponse> {
            let method = match req.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, &req.url);
            for (k, v) in &req.headers {
                builder = builder.header(k, v);
            }

            builder = match req.body {
                RequestBody::Empty => builder,
                RequestBody::Json(json) => builder
                    .header("Content-Type", "application/json")
                    .body(json),
                RequestBody::Form(fields) => builder.multipart(multipart(fields)?),
            };

            let resp = builder
                .send()
                .await
                .map_err(|e| ConsoleError::network(format!("Reqwest Error: {}", e)))?;

            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .map_err(|e| ConsoleError::network(format!("Reqwest Body Error: {}", e)))?;

            Ok(HttpResponse { status, body })
        }
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
#[derive(Clone)]
enum MockReply {
    Respond(u16, String),
    NetworkDown,
}

#[cfg(test)]
pub struct MockHttpClient {
    // ("METHOD url", 依次返回的响应；最后一个会一直重复)
    replies: RefCell<HashMap<String, VecDeque<MockReply>>>,
    // 记录发出的请求
    pub requests: RefCell<Vec<HttpRequest>>,
    // 响应前先让出一次执行权，模拟请求仍在途中
    yield_before_reply: bool,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            replies: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            yield_before_reply: false,
        }
    }

    pub fn in_flight() -> Self {
        Self {
            yield_before_reply: true,
            ..Self::new()
        }
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.replies
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(MockReply::Respond(status, body.to_string()));
    }

    pub fn mock_raw(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.replies
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(MockReply::Respond(status, body.to_string()));
    }

    pub fn mock_network_error(&self, method: HttpMethod, url: &str) {
        self.replies
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(MockReply::NetworkDown);
    }

    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    fn next_reply(&self, key: &str) -> Option<MockReply> {
        let mut replies = self.replies.borrow_mut();
        let queue = replies.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> ConsoleResult<HttpResponse> {
        let key = Self::key(req.method, &req.url);
        self.requests.borrow_mut().push(req);

        if self.yield_before_reply {
            tokio::task::yield_now().await;
        }

        match self.next_reply(&key) {
            Some(MockReply::Respond(status, body)) => Ok(HttpResponse { status, body }),
            Some(MockReply::NetworkDown) => {
                Err(crate::error::ConsoleError::network("connection refused"))
            }
            None => Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}
