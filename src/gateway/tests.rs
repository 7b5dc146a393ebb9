use super::*;
use crate::config::StorageKeys;
use crate::request::MockHttpClient;
use crate::route::{AppRoute, Decision, authorize, resolve};
use crate::storage::MemoryStorage;
use clinic_console_shared::form::{ClinicContacts, LogoFile};
use clinic_console_shared::protocol::{FormValue, HttpMethod, RequestBody};
use serde_json::json;

const BASE: &str = "http://api.test";

// =========================================================
// Test Fixtures
// =========================================================

struct Harness {
    storage: MemoryStorage,
    gateway: ClinicGateway<MockHttpClient, MemoryStorage>,
}

impl Harness {
    fn with_client(client: MockHttpClient) -> Self {
        let storage = MemoryStorage::new();
        let session = Rc::new(SessionStore::new(storage.clone(), StorageKeys::default()));
        session.hydrate();
        let gateway = ClinicGateway::new(ConsoleConfig::new(BASE), client, session);
        Self { storage, gateway }
    }

    fn new() -> Self {
        Self::with_client(MockHttpClient::new())
    }

    fn mock(&self) -> &MockHttpClient {
        self.gateway.client()
    }

    fn sign_in(&self, role: &str) {
        self.gateway
            .session()
            .set_session("tok-1".to_string(), profile(role));
    }
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

fn profile(role: &str) -> UserDetails {
    serde_json::from_value(user_json(role)).unwrap()
}

fn user_json(role: &str) -> Value {
    json!({
        "id": 7,
        "name": "Root",
        "username": "root",
        "role": { "id": 1, "name": role },
        "permissions": ["create_clinic"]
    })
}

fn login_body(role: &str, token: Option<&str>) -> Value {
    let mut data = user_json(role);
    if let Some(token) = token {
        data["token"] = json!(token);
    }
    json!({ "data": data, "message": "ok" })
}

fn admins_body(names: &[&str]) -> Value {
    let data: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "id": i + 1,
                "name": name,
                "username": name.to_lowercase(),
                "role": { "id": 2, "name": "admins" }
            })
        })
        .collect();
    json!({ "data": data })
}

fn clinics_body() -> Value {
    json!({ "data": [ { "id": 1, "name": "Cardio", "requirements": ["ID card"] } ] })
}

fn clinic_payload() -> CreateClinicPayload {
    CreateClinicPayload {
        name_ar: "عيادة".into(),
        name_en: "Clinic".into(),
        city_id: "3".into(),
        address_ar: "شارع".into(),
        address_en: "Street".into(),
        url_name: "clinic".into(),
        color: "#ff0000".into(),
        logo: Some(LogoFile {
            file_name: "logo.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        }),
        requirements: vec!["ID card".into()],
        contacts: ClinicContacts {
            phone: "0999".into(),
            whatsapp: "0988".into(),
            facebook: "https://fb.example/clinic".into(),
        },
    }
}

// =========================================================
// 认证
// =========================================================

#[tokio::test]
async fn login_success_persists_session() {
    let h = Harness::new();
    h.mock().mock_response(
        HttpMethod::Post,
        &url("/login"),
        200,
        login_body("super_admins", Some("tok-9")),
    );

    let success = h.gateway.login("root", "secret-pass").await.unwrap();
    assert_eq!(success.token, "tok-9");
    assert_eq!(success.user.role_name(), "super_admins");

    let snap = h.gateway.session().snapshot();
    assert!(snap.is_authenticated);
    assert_eq!(snap.token.as_deref(), Some("tok-9"));
    assert_eq!(h.storage.raw("token").as_deref(), Some("tok-9"));
    assert_eq!(authorize(AppRoute::Dashboard, &snap), Decision::Allowed);

    let sent = h.mock().requests.borrow();
    match &sent[0].body {
        RequestBody::Json(json) => {
            let body: Value = serde_json::from_str(json).unwrap();
            assert_eq!(body, json!({ "username": "root", "password": "secret-pass" }));
        }
        other => panic!("unexpected login body: {:?}", other),
    }
    assert!(sent[0].header(HEADER_AUTHORIZATION).is_none());
}

#[tokio::test]
async fn rejected_credentials_leave_session_unchanged() {
    let h = Harness::new();
    h.mock().mock_response(
        HttpMethod::Post,
        &url("/login"),
        401,
        json!({ "message": "Invalid credentials" }),
    );

    let err = h.gateway.login("root", "wrong-pass").await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Authentication);
    assert_eq!(err.message(), "Invalid credentials");
    assert_eq!(h.gateway.session().snapshot(), Default::default());
}

#[tokio::test]
async fn login_without_token_is_an_authentication_error() {
    let h = Harness::new();
    h.mock().mock_response(
        HttpMethod::Post,
        &url("/login"),
        200,
        login_body("admins", None),
    );

    let err = h.gateway.login("root", "secret-pass").await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Authentication);
    assert!(!h.gateway.session().is_authenticated());
    assert!(h.storage.raw("userDetails").is_none());
}

#[tokio::test]
async fn blank_credentials_never_reach_the_network() {
    let h = Harness::new();
    let err = h.gateway.login("  ", "secret-pass").await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Validation);
    assert!(h.mock().requests.borrow().is_empty());
}

#[tokio::test]
async fn logout_success_clears_session() {
    let h = Harness::new();
    h.sign_in("admins");
    h.mock()
        .mock_response(HttpMethod::Get, &url("/logout"), 200, json!({ "message": "bye" }));

    let ack = h.gateway.logout().await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("bye"));
    assert_eq!(h.gateway.session().snapshot(), Default::default());
    assert!(h.storage.raw("token").is_none());
    assert!(h.storage.raw("userDetails").is_none());
}

#[tokio::test]
async fn logout_failure_keeps_session() {
    let h = Harness::new();
    h.sign_in("admins");
    h.mock().mock_network_error(HttpMethod::Get, &url("/logout"));
    h.mock()
        .mock_response(HttpMethod::Get, &url("/logout"), 401, json!({}));

    let err = h.gateway.logout().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Network);
    assert!(h.gateway.session().is_authenticated());

    let err = h.gateway.logout().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Authentication);
    assert!(h.gateway.session().is_authenticated());
}

#[tokio::test]
async fn logout_drops_cached_reads_of_the_previous_user() {
    let h = Harness::new();
    let clinics = url("/clinic");
    h.mock()
        .mock_response(HttpMethod::Get, &clinics, 200, clinics_body());
    h.mock()
        .mock_response(HttpMethod::Get, &url("/logout"), 200, json!({ "message": "bye" }));
    h.mock()
        .mock_response(HttpMethod::Post, &url("/login"), 200, login_body("admins", Some("tok-2")));

    h.sign_in("super_admins");
    h.gateway.list_clinics().await.unwrap();
    h.gateway.logout().await.unwrap();

    h.gateway.login("second", "password2").await.unwrap();
    h.gateway.list_clinics().await.unwrap();
    assert_eq!(h.mock().count(HttpMethod::Get, &clinics), 2);

    let last = h.mock().requests.borrow().last().cloned().unwrap();
    assert_eq!(last.header("Authorization"), Some("Bearer tok-2"));
}

#[tokio::test]
async fn discarding_the_session_works_without_the_server() {
    let h = Harness::new();
    h.sign_in("receptionists");
    let clinics = url("/clinic");
    h.mock()
        .mock_response(HttpMethod::Get, &clinics, 200, clinics_body());
    h.mock().mock_network_error(HttpMethod::Get, &url("/logout"));

    h.gateway.list_clinics().await.unwrap();
    assert!(h.gateway.logout().await.is_err());
    assert_eq!(
        resolve(AppRoute::Login, &h.gateway.session().snapshot()),
        AppRoute::Unauthorized
    );

    h.gateway.discard_session();
    assert_eq!(h.gateway.session().snapshot(), Default::default());
    assert!(h.storage.raw("token").is_none());
    assert_eq!(
        resolve(AppRoute::Dashboard, &h.gateway.session().snapshot()),
        AppRoute::Login
    );

    h.sign_in("admins");
    h.gateway.list_clinics().await.unwrap();
    assert_eq!(h.mock().count(HttpMethod::Get, &clinics), 2);
}

// =========================================================
// 请求头与错误分类
// =========================================================

#[tokio::test]
async fn bearer_token_follows_the_session() {
    let h = Harness::new();
    h.mock()
        .mock_response(HttpMethod::Get, &url("/clinic"), 200, clinics_body());
    h.mock()
        .mock_response(HttpMethod::Get, &url("/actor/2"), 200, admins_body(&[]));

    h.gateway.list_clinics().await.unwrap();
    h.sign_in("admins");
    h.gateway.list_admins().await.unwrap();

    let sent = h.mock().requests.borrow();
    assert_eq!(sent[0].header(HEADER_AUTHORIZATION), None);
    assert_eq!(sent[1].header(HEADER_AUTHORIZATION), Some("Bearer tok-1"));
}

#[tokio::test]
async fn errors_are_categorised() {
    let h = Harness::new();
    let cases = [
        (403, ErrorStatus::Authorization),
        (404, ErrorStatus::NotFound),
        (500, ErrorStatus::Server),
        (422, ErrorStatus::Server),
    ];
    for (status, expected) in cases {
        let path = format!("/clinic/{}", status);
        h.mock().mock_response(
            HttpMethod::Put,
            &url(&path),
            status,
            json!({ "message": format!("failed with {}", status) }),
        );
        let payload = UpdateClinicPayload::from_clinic(&serde_json::from_value(json!({
            "id": status,
            "name_ar": "ع",
            "name_en": "C",
            "address_ar": "ش",
            "address_en": "S",
            "url_name": "c",
            "city_id": { "id": 1 },
            "contact_information": [
                { "communication_type_id": 1, "value": "1" },
                { "communication_type_id": 4, "value": "2" },
                { "communication_type_id": 5, "value": "3" }
            ]
        }))
        .unwrap());
        let err = h
            .gateway
            .update_clinic(status as u32, payload)
            .await
            .unwrap_err();
        assert_eq!(err.status, expected, "status {}", status);
        assert_eq!(err.message(), format!("failed with {}", status));
    }

    h.mock().mock_network_error(HttpMethod::Get, &url("/clinic"));
    let err = h.gateway.list_clinics().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Network);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_success_body_is_reported() {
    let h = Harness::new();
    h.mock()
        .mock_raw(HttpMethod::Get, &url("/clinic"), 200, "<html>oops</html>");
    let err = h.gateway.list_clinics().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::MalformedResponse);

    h.mock()
        .mock_response(HttpMethod::Get, &url("/actor/2"), 200, json!({ "data": 5 }));
    let err = h.gateway.list_admins().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::MalformedResponse);
}

#[tokio::test]
async fn non_json_error_body_uses_generic_message() {
    let h = Harness::new();
    h.mock()
        .mock_raw(HttpMethod::Get, &url("/clinic"), 502, "<html>Bad Gateway</html>");
    let err = h.gateway.list_clinics().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Server);
    assert_eq!(err.message(), "request failed with status 502");
}

#[tokio::test]
async fn rejected_token_expires_the_session() {
    let h = Harness::new();
    h.sign_in("super_admins");
    h.mock().mock_response(
        HttpMethod::Get,
        &url("/clinic"),
        401,
        json!({ "message": "Unauthenticated." }),
    );

    let err = h.gateway.list_clinics().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Authentication);

    let snap = h.gateway.session().snapshot();
    assert!(!snap.is_authenticated);
    assert_eq!(
        authorize(AppRoute::Dashboard, &snap),
        Decision::DeniedTo(AppRoute::Login)
    );
}

#[tokio::test]
async fn rejected_token_drops_cached_reads() {
    let h = Harness::new();
    h.sign_in("super_admins");
    let clinics = url("/clinic");
    let admins = url("/actor/2");
    h.mock()
        .mock_response(HttpMethod::Get, &clinics, 200, clinics_body());
    h.mock()
        .mock_response(HttpMethod::Get, &admins, 401, json!({ "message": "Unauthenticated." }));
    h.mock()
        .mock_response(HttpMethod::Get, &admins, 200, admins_body(&["Sara"]));

    h.gateway.list_clinics().await.unwrap();
    let err = h.gateway.list_admins().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Authentication);

    h.sign_in("admins");
    h.gateway.list_clinics().await.unwrap();
    assert_eq!(h.mock().count(HttpMethod::Get, &clinics), 2);
}

// =========================================================
// 缓存与失效
// =========================================================

#[tokio::test]
async fn reads_are_cached_until_a_mutation_invalidates_them() {
    let h = Harness::new();
    h.sign_in("super_admins");
    let clinics = url("/clinic");
    h.mock()
        .mock_response(HttpMethod::Get, &clinics, 200, clinics_body());
    h.mock()
        .mock_response(HttpMethod::Post, &clinics, 200, json!({ "message": "created" }));

    let first = h.gateway.list_clinics().await.unwrap();
    let second = h.gateway.list_clinics().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.mock().count(HttpMethod::Get, &clinics), 1);

    h.gateway.create_clinic(clinic_payload()).await.unwrap();
    h.gateway.list_clinics().await.unwrap();
    assert_eq!(h.mock().count(HttpMethod::Get, &clinics), 2);
}

#[tokio::test]
async fn invalidation_only_touches_its_own_tag() {
    let h = Harness::new();
    h.sign_in("super_admins");
    h.mock()
        .mock_response(HttpMethod::Get, &url("/clinic"), 200, clinics_body());
    h.mock()
        .mock_response(HttpMethod::Get, &url("/actor/2"), 200, admins_body(&["Sam"]));
    h.mock().mock_response(
        HttpMethod::Post,
        &url("/actor_permissions/1"),
        200,
        json!({ "message": "saved" }),
    );

    h.gateway.list_clinics().await.unwrap();
    h.gateway.list_admins().await.unwrap();
    h.gateway
        .set_permissions(1, &[PermissionGrant::UPDATE_CLINIC])
        .await
        .unwrap();
    h.gateway.list_clinics().await.unwrap();
    h.gateway.list_admins().await.unwrap();

    assert_eq!(h.mock().count(HttpMethod::Get, &url("/clinic")), 1);
    assert_eq!(h.mock().count(HttpMethod::Get, &url("/actor/2")), 2);
}

#[tokio::test]
async fn failed_mutation_keeps_the_cache() {
    let h = Harness::new();
    h.sign_in("super_admins");
    h.mock()
        .mock_response(HttpMethod::Get, &url("/actor/2"), 200, admins_body(&["Sam"]));
    h.mock().mock_response(
        HttpMethod::Post,
        &url("/actor_permissions/1"),
        500,
        json!({ "message": "boom" }),
    );

    h.gateway.list_admins().await.unwrap();
    let err = h.gateway.set_permissions(1, &[]).await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Server);
    h.gateway.list_admins().await.unwrap();
    assert_eq!(h.mock().count(HttpMethod::Get, &url("/actor/2")), 1);
}

#[tokio::test]
async fn failed_reads_are_not_cached() {
    let h = Harness::new();
    let clinics = url("/clinic");
    h.mock().mock_network_error(HttpMethod::Get, &clinics);
    h.mock()
        .mock_response(HttpMethod::Get, &clinics, 200, clinics_body());

    assert!(h.gateway.list_clinics().await.is_err());
    assert_eq!(h.gateway.list_clinics().await.unwrap().len(), 1);
    assert_eq!(h.mock().count(HttpMethod::Get, &clinics), 2);
}

#[tokio::test]
async fn concurrent_identical_reads_share_one_request() {
    let h = Harness::with_client(MockHttpClient::in_flight());
    h.sign_in("super_admins");
    let admins = url("/actor/2");
    h.mock()
        .mock_response(HttpMethod::Get, &admins, 200, admins_body(&["Sam", "Lea"]));

    let (a, b) = futures::join!(h.gateway.list_admins(), h.gateway.list_admins());
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(h.mock().count(HttpMethod::Get, &admins), 1);
}

#[tokio::test]
async fn mutation_during_read_forces_refetch() {
    let h = Harness::with_client(MockHttpClient::in_flight());
    h.sign_in("super_admins");
    let admins = url("/actor/2");
    h.mock()
        .mock_response(HttpMethod::Get, &admins, 200, admins_body(&["Sam"]));
    h.mock().mock_response(
        HttpMethod::Post,
        &url("/actor_permissions/1"),
        200,
        json!({ "message": "saved" }),
    );

    let (listed, saved) = futures::join!(
        h.gateway.list_admins(),
        h.gateway.set_permissions(1, &[PermissionGrant::SHOW_CLINIC])
    );
    listed.unwrap();
    saved.unwrap();

    h.gateway.list_admins().await.unwrap();
    assert_eq!(h.mock().count(HttpMethod::Get, &admins), 2);
}

// =========================================================
// 写请求
// =========================================================

#[tokio::test]
async fn invalid_payload_is_rejected_before_submission() {
    let h = Harness::new();
    h.sign_in("super_admins");

    let mut payload = clinic_payload();
    payload.logo = None;
    let err = h.gateway.create_clinic(payload).await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Validation);
    assert!(err.message().contains("logo"));

    let err = h
        .gateway
        .create_admin(CreateAdminPayload::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, ErrorStatus::Validation);
    assert!(h.mock().requests.borrow().is_empty());
}

#[tokio::test]
async fn permissions_are_sent_as_slot_fields() {
    let h = Harness::new();
    h.sign_in("super_admins");
    let endpoint = url("/actor_permissions/4");
    h.mock()
        .mock_response(HttpMethod::Post, &endpoint, 200, json!({ "message": "ok" }));

    h.gateway
        .set_permissions(4, &[PermissionGrant::UPDATE_CLINIC, PermissionGrant::SHOW_CLINIC])
        .await
        .unwrap();
    h.gateway.set_permissions(4, &[]).await.unwrap();

    let sent = h.mock().requests.borrow();
    let RequestBody::Form(fields) = &sent[0].body else {
        panic!("permissions must be multipart");
    };
    let pairs: Vec<_> = fields
        .iter()
        .map(|f| (f.name.as_str(), f.as_text().unwrap()))
        .collect();
    assert_eq!(pairs, vec![("permissions[5]", "6"), ("permissions[7]", "8")]);

    let RequestBody::Form(fields) = &sent[1].body else {
        panic!("permissions must be multipart");
    };
    assert!(fields.is_empty());
}

#[tokio::test]
async fn clinic_logo_travels_as_a_file_part() {
    let h = Harness::new();
    h.sign_in("super_admins");
    h.mock()
        .mock_response(HttpMethod::Post, &url("/clinic"), 201, json!({}));

    h.gateway.create_clinic(clinic_payload()).await.unwrap();

    let sent = h.mock().requests.borrow();
    let RequestBody::Form(fields) = &sent[0].body else {
        panic!("clinic creation must be multipart");
    };
    let logo = fields.iter().find(|f| f.name == "logo").unwrap();
    assert!(matches!(&logo.value, FormValue::File { file_name, .. } if file_name == "logo.png"));
    assert!(fields.iter().any(|f| f.name == "requirements[0]"));
}

#[tokio::test]
async fn empty_success_body_is_an_empty_ack() {
    let h = Harness::new();
    h.sign_in("super_admins");
    h.mock()
        .mock_raw(HttpMethod::Post, &url("/actor_permissions/2"), 204, "");
    let ack = h.gateway.set_permissions(2, &[]).await.unwrap();
    assert_eq!(ack, Ack::default());
}

#[test]
fn request_state_follows_result() {
    let ok: RequestState<u8> = Ok(3).into();
    assert_eq!(ok, RequestState::Fulfilled(3));
    let err: RequestState<u8> = Err(ConsoleError::network("down")).into();
    assert!(matches!(err, RequestState::Rejected(e) if e.status == ErrorStatus::Network));
}
