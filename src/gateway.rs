//! 远程数据网关
//!
//! 每个后端能力对应一个方法。读请求按资源标签缓存，并对相同的并发读请求合并为一次网络往返；
//! 写请求成功后使对应标签下的缓存全部失效。没有基于时间的过期，也没有自动重试。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use clinic_console_shared::protocol::{
    CreateAdminRequest, CreateClinicRequest, Endpoint, ListAdminsRequest, ListClinicsRequest,
    LoginRequest, LogoutRequest, SetPermissionsRequest, UpdateClinicRequest,
};
use clinic_console_shared::{
    Ack, Admin, Clinic, CreateAdminPayload, CreateClinicPayload, Credentials,
    HEADER_AUTHORIZATION, PermissionGrant, ResourceTag, UpdateClinicPayload, UserDetails,
};
use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult, ErrorStatus};
use crate::request::{HttpClient, HttpRequest, HttpResponse};
use crate::session::SessionStore;
use crate::storage::SessionStorage;

type SharedFetch = Shared<LocalBoxFuture<'static, ConsoleResult<Value>>>;

/// 单次请求在视图层的状态
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Pending,
    Fulfilled(T),
    Rejected(ConsoleError),
}

impl<T> From<ConsoleResult<T>> for RequestState<T> {
    fn from(result: ConsoleResult<T>) -> Self {
        match result {
            Ok(value) => RequestState::Fulfilled(value),
            Err(e) => RequestState::Rejected(e),
        }
    }
}

/// 登录成功的结果
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    pub token: String,
    pub user: UserDetails,
}

struct CacheEntry {
    tag: ResourceTag,
    body: Value,
}

struct InFlight {
    id: u64,
    tag: ResourceTag,
    generation: u64,
    fetch: SharedFetch,
}

/// 按 "METHOD path" 缓存的读结果与在途请求
#[derive(Default)]
struct QueryCache {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, InFlight>,
    /// 每个标签被失效的次数；在途请求完成时若代数已变化则不写入缓存
    generations: HashMap<ResourceTag, u64>,
    next_flight_id: u64,
}

impl QueryCache {
    fn generation(&self, tag: ResourceTag) -> u64 {
        self.generations.get(&tag).copied().unwrap_or(0)
    }

    fn invalidate(&mut self, tag: ResourceTag) {
        self.entries.retain(|_, entry| entry.tag != tag);
        self.in_flight.retain(|_, flight| flight.tag != tag);
        *self.generations.entry(tag).or_insert(0) += 1;
    }

    /// 会话结束：丢弃全部读结果与在途请求
    fn reset(&mut self) {
        for tag in ResourceTag::ALL {
            self.invalidate(tag);
        }
        self.entries.clear();
        self.in_flight.clear();
    }
}

/// 后端 REST API 的类型化客户端
///
/// 每个请求在存在令牌时附带 `Authorization: Bearer <token>`。
pub struct ClinicGateway<C, S> {
    config: ConsoleConfig,
    client: Rc<C>,
    session: Rc<SessionStore<S>>,
    cache: Rc<RefCell<QueryCache>>,
}

impl<C, S> ClinicGateway<C, S>
where
    C: HttpClient + 'static,
    S: SessionStorage + 'static,
{
    pub fn new(config: ConsoleConfig, client: C, session: Rc<SessionStore<S>>) -> Self {
        Self {
            config,
            client: Rc::new(client),
            session,
            cache: Rc::new(RefCell::new(QueryCache::default())),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn session(&self) -> &Rc<SessionStore<S>> {
        &self.session
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    // =========================================================
    // 认证
    // =========================================================

    /// 用凭据登录；成功后写入会话
    ///
    /// 凭据错误或响应中缺少令牌时返回 `Authentication` 错误，会话保持不变。
    pub async fn login(&self, username: &str, password: &str) -> ConsoleResult<LoginSuccess> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(
                ConsoleError::validation("Username and password are required").in_op("gateway.login"),
            );
        }

        let request = LoginRequest(Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        });
        let http = self.build(&request).map_err(|e| e.in_op("gateway.login"))?;
        let body = self
            .dispatch(http, false)
            .await
            .map_err(|e| e.in_op("gateway.login"))?;
        let envelope = decode::<<LoginRequest as Endpoint>::Response>(body)
            .map_err(|e| e.in_op("gateway.login"))?;

        let data = envelope.data;
        let Some(token) = data.token.filter(|t| !t.is_empty()) else {
            error!(username = %data.user.username, "token is missing in the login response");
            return Err(ConsoleError::authentication("Token is missing in the response")
                .in_op("gateway.login"));
        };

        self.session.set_session(token.clone(), data.user.clone());
        info!(
            username = %data.user.username,
            role = %data.user.role_name(),
            "signed in"
        );
        Ok(LoginSuccess {
            token,
            user: data.user,
        })
    }

    /// 注销
    ///
    /// 成功时先清除令牌和资料再返回；失败时会话原样保留（fail-open），错误返回给调用方。
    pub async fn logout(&self) -> ConsoleResult<Ack> {
        let result = async {
            let request = self.build(&LogoutRequest)?;
            decode::<Ack>(self.dispatch(request, false).await?)
        }
        .await;

        match result.map_err(|e| e.in_op("gateway.logout")) {
            Ok(ack) => {
                self.discard_session();
                info!("signed out");
                Ok(ack)
            }
            Err(e) => {
                warn!(error = %e, "problem while logging out, keeping local session");
                Err(e)
            }
        }
    }

    /// 不经服务器结束本地会话：清除令牌、资料和全部缓存
    pub fn discard_session(&self) {
        self.session.clear_token();
        self.session.clear_profile();
        self.cache.borrow_mut().reset();
    }

    // =========================================================
    // 诊所
    // =========================================================

    pub async fn list_clinics(&self) -> ConsoleResult<Vec<Clinic>> {
        let envelope = self
            .query("gateway.list_clinics", &ListClinicsRequest)
            .await?;
        Ok(envelope.data)
    }

    pub async fn create_clinic(&self, payload: CreateClinicPayload) -> ConsoleResult<Ack> {
        payload
            .validate()
            .map_err(|e| ConsoleError::from(e).in_op("gateway.create_clinic"))?;
        self.mutate("gateway.create_clinic", &CreateClinicRequest(payload))
            .await
    }

    pub async fn update_clinic(
        &self,
        clinic_id: u32,
        payload: UpdateClinicPayload,
    ) -> ConsoleResult<Ack> {
        payload
            .validate()
            .map_err(|e| ConsoleError::from(e).in_op("gateway.update_clinic"))?;
        self.mutate(
            "gateway.update_clinic",
            &UpdateClinicRequest { clinic_id, payload },
        )
        .await
    }

    // =========================================================
    // 管理员
    // =========================================================

    pub async fn list_admins(&self) -> ConsoleResult<Vec<Admin>> {
        let request = ListAdminsRequest {
            role_id: self.config.admin_role_id,
        };
        let envelope = self.query("gateway.list_admins", &request).await?;
        Ok(envelope.data)
    }

    pub async fn create_admin(&self, payload: CreateAdminPayload) -> ConsoleResult<Ack> {
        payload
            .validate()
            .map_err(|e| ConsoleError::from(e).in_op("gateway.create_admin"))?;
        self.mutate("gateway.create_admin", &CreateAdminRequest(payload))
            .await
    }

    /// 覆盖管理员的权限；`granted` 为空时撤销全部
    pub async fn set_permissions(
        &self,
        admin_id: u32,
        granted: &[PermissionGrant],
    ) -> ConsoleResult<Ack> {
        let request = SetPermissionsRequest {
            admin_id,
            granted: granted.to_vec(),
        };
        self.mutate("gateway.set_permissions", &request).await
    }

    // =========================================================
    // 内部实现
    // =========================================================

    fn build<E: Endpoint>(&self, endpoint: &E) -> ConsoleResult<HttpRequest> {
        let body = endpoint
            .body()
            .map_err(|e| ConsoleError::validation(format!("cannot encode request: {}", e)))?;
        let mut request = HttpRequest::new(&self.config.url(&endpoint.path()), E::METHOD)
            .with_header("Accept", "application/json")
            .with_body(body);
        if let Some(token) = self.session.token() {
            request = request.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }
        Ok(request)
    }

    /// 发送请求并把响应分类为成功 JSON 或带类别的错误
    ///
    /// 返回的 future 是 `'static` 的，以便被多个调用方共享。
    fn dispatch(
        &self,
        request: HttpRequest,
        expire_session_on_401: bool,
    ) -> LocalBoxFuture<'static, ConsoleResult<Value>> {
        let client = Rc::clone(&self.client);
        let session = Rc::clone(&self.session);
        let cache = Rc::clone(&self.cache);
        async move {
            let label = format!("{} {}", request.method.as_str(), request.url);
            let carried_token = request.header(HEADER_AUTHORIZATION).is_some();

            let resp = client
                .send(request)
                .await
                .map_err(|e| e.in_op_with("gateway.dispatch", label.clone()))?;

            if !resp.is_success() {
                let status = ErrorStatus::from_http(resp.status);
                if status == ErrorStatus::Authentication && carried_token && expire_session_on_401
                {
                    warn!(request = %label, "token rejected, clearing session");
                    session.clear_token();
                    session.clear_profile();
                    cache.borrow_mut().reset();
                }
                return Err(ConsoleError::new(status, server_message(&resp))
                    .in_op_with("gateway.dispatch", label));
            }

            parse_body(&resp.body).map_err(|e| e.in_op_with("gateway.dispatch", label))
        }
        .boxed_local()
    }

    /// 带缓存与合并的读请求
    async fn query<E: Endpoint>(&self, op: &'static str, endpoint: &E) -> ConsoleResult<E::Response> {
        let Some(tag) = E::PROVIDES else {
            let request = self.build(endpoint).map_err(|e| e.in_op(op))?;
            let body = self.dispatch(request, true).await.map_err(|e| e.in_op(op))?;
            return decode(body).map_err(|e| e.in_op(op));
        };

        let key = format!("{} {}", E::METHOD.as_str(), endpoint.path());
        let (flight_id, generation, fetch) = {
            let mut cache = self.cache.borrow_mut();
            if let Some(entry) = cache.entries.get(&key) {
                debug!(key = %key, tag = ?tag, "cache hit");
                return decode(entry.body.clone()).map_err(|e| e.in_op(op));
            }

            match cache.in_flight.get(&key) {
                Some(flight) => {
                    debug!(key = %key, "joining in-flight request");
                    (flight.id, flight.generation, flight.fetch.clone())
                }
                None => {
                    debug!(key = %key, tag = ?tag, "cache miss");
                    let request = self.build(endpoint).map_err(|e| e.in_op(op))?;
                    let fetch = self.dispatch(request, true).shared();
                    let id = cache.next_flight_id;
                    cache.next_flight_id += 1;
                    let generation = cache.generation(tag);
                    cache.in_flight.insert(
                        key.clone(),
                        InFlight {
                            id,
                            tag,
                            generation,
                            fetch: fetch.clone(),
                        },
                    );
                    (id, generation, fetch)
                }
            }
        };

        let result = fetch.await;

        {
            let mut cache = self.cache.borrow_mut();
            let still_ours = cache
                .in_flight
                .get(&key)
                .is_some_and(|flight| flight.id == flight_id);
            if still_ours {
                cache.in_flight.remove(&key);
                if let Ok(body) = &result {
                    if cache.generation(tag) == generation {
                        cache.entries.insert(
                            key.clone(),
                            CacheEntry {
                                tag,
                                body: body.clone(),
                            },
                        );
                    }
                }
            } else if result.is_ok() {
                debug!(key = %key, "result invalidated while in flight, not cached");
            }
        }

        decode(result.map_err(|e| e.in_op(op))?).map_err(|e| e.in_op(op))
    }

    /// 写请求：成功后失效所声明的标签
    async fn mutate<E: Endpoint>(&self, op: &'static str, endpoint: &E) -> ConsoleResult<E::Response> {
        let request = self.build(endpoint).map_err(|e| e.in_op(op))?;
        let body = self.dispatch(request, true).await.map_err(|e| e.in_op(op))?;

        if !E::INVALIDATES.is_empty() {
            let mut cache = self.cache.borrow_mut();
            for tag in E::INVALIDATES {
                debug!(tag = ?tag, "invalidating cached reads");
                cache.invalidate(*tag);
            }
        }

        decode(body).map_err(|e| e.in_op(op))
    }
}

fn parse_body(body: &str) -> ConsoleResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(body)
        .map_err(|e| ConsoleError::malformed(format!("response is not valid JSON: {}", e)))
}

fn decode<T: DeserializeOwned>(body: Value) -> ConsoleResult<T> {
    serde_json::from_value(body)
        .map_err(|e| ConsoleError::malformed(format!("unexpected response shape: {}", e)))
}

/// 非 2xx 响应的错误消息：优先取 JSON 中的 `message`
fn server_message(resp: &HttpResponse) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&resp.body) {
        if let Some(Value::String(message)) = map.get("message") {
            return message.clone();
        }
    }
    let text = resp.body.trim();
    if !text.is_empty() && text.len() <= 200 && !text.starts_with('<') {
        return text.to_string();
    }
    format!("request failed with status {}", resp.status)
}

#[cfg(test)]
mod tests;
