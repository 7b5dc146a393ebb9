//! End-to-end tests for the gateway over real HTTP using a wiremock server

use std::rc::Rc;

use clinic_console::{
    AppRoute, ClinicGateway, ConsoleConfig, ErrorStatus, MemoryStorage, ReqwestHttpClient,
    SessionStore, StorageKeys, resolve,
};
use clinic_console_shared::PermissionGrant;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, header_exists, method, path},
};

type Gateway = ClinicGateway<ReqwestHttpClient, MemoryStorage>;

fn gateway(server: &MockServer, storage: &MemoryStorage) -> Gateway {
    let session = Rc::new(SessionStore::new(storage.clone(), StorageKeys::default()));
    session.hydrate();
    let config = ConsoleConfig::new(&format!("{}/api/", server.uri()));
    ClinicGateway::new(config, ReqwestHttpClient::new(), session)
}

async fn mount_login(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_string_contains("\"username\":\"root\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 1,
                "name": "Root",
                "username": "root",
                "role": { "id": 1, "name": role },
                "permissions": [],
                "token": "live-token"
            },
            "message": "Logged in"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_then_list_clinics_with_bearer() {
    let server = MockServer::start().await;
    mount_login(&server, "super_admins").await;

    Mock::given(method("GET"))
        .and(path("/api/clinic"))
        .and(header("Authorization", "Bearer live-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": 1, "name": "Cardio", "url_name": "cardio" },
                { "id": 2, "name": "Dental", "url_name": "dental" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let gw = gateway(&server, &storage);

    let success = gw.login("root", "password1").await.unwrap();
    assert_eq!(success.token, "live-token");
    assert_eq!(storage.raw("token").as_deref(), Some("live-token"));
    assert_eq!(
        resolve(AppRoute::Login, &gw.session().snapshot()),
        AppRoute::Dashboard
    );

    let clinics = gw.list_clinics().await.unwrap();
    assert_eq!(clinics.len(), 2);
    assert_eq!(clinics[1].display_name(), "Dental");

    // served from cache
    gw.list_clinics().await.unwrap();
}

#[tokio::test]
async fn test_session_restored_after_reload() {
    let server = MockServer::start().await;
    mount_login(&server, "admins").await;

    let storage = MemoryStorage::new();
    gateway(&server, &storage)
        .login("root", "password1")
        .await
        .unwrap();

    let reloaded = gateway(&server, &storage);
    let snap = reloaded.session().snapshot();
    assert!(snap.is_authenticated);
    assert_eq!(snap.role(), Some("admins"));
    assert_eq!(resolve(AppRoute::AddAdmin, &snap), AppRoute::Unauthorized);
}

#[tokio::test]
async fn test_wrong_password_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let gw = gateway(&server, &storage);
    let err = gw.login("root", "nope-nope").await.unwrap_err();

    assert_eq!(err.status, ErrorStatus::Authentication);
    assert_eq!(err.message(), "Invalid credentials");
    assert!(err.to_string().contains("AUTHENTICATION_FAILED"));
    assert!(storage.raw("token").is_none());
}

#[tokio::test]
async fn test_permissions_posted_as_multipart() {
    let server = MockServer::start().await;
    mount_login(&server, "super_admins").await;

    Mock::given(method("POST"))
        .and(path("/api/actor_permissions/12"))
        .and(header_exists("Authorization"))
        .and(body_string_contains("permissions[5]"))
        .and(body_string_contains("permissions[7]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Updated" })))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server, &MemoryStorage::new());
    gw.login("root", "password1").await.unwrap();

    let ack = gw
        .set_permissions(12, &[PermissionGrant::UPDATE_CLINIC, PermissionGrant::SHOW_CLINIC])
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Updated"));
}

#[tokio::test]
async fn test_admin_list_refetched_after_create() {
    let server = MockServer::start().await;
    mount_login(&server, "super_admins").await;

    Mock::given(method("GET"))
        .and(path("/api/actor/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/actor"))
        .and(body_string_contains("jdoe"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "Created" })))
        .mount(&server)
        .await;

    let gw = gateway(&server, &MemoryStorage::new());
    gw.login("root", "password1").await.unwrap();

    assert!(gw.list_admins().await.unwrap().is_empty());
    gw.list_admins().await.unwrap();

    let payload = clinic_console_shared::CreateAdminPayload {
        username: "jdoe".into(),
        password: "longenough".into(),
        city_id: "1".into(),
        name_ar: "جون".into(),
        name_en: "John".into(),
        phone_number: "0999".into(),
        clinic_id: "3".into(),
        specialization_id: "4".into(),
        description: "Night shift".into(),
        birth_date: "1990-05-01".into(),
        ..Default::default()
    };
    gw.create_admin(payload).await.unwrap();
    gw.list_admins().await.unwrap();
}

#[tokio::test]
async fn test_expired_token_signs_out() {
    let server = MockServer::start().await;
    mount_login(&server, "admins").await;

    Mock::given(method("GET"))
        .and(path("/api/actor/2"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthenticated." })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let gw = gateway(&server, &storage);
    gw.login("root", "password1").await.unwrap();

    let err = gw.list_admins().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Authentication);
    assert!(!gw.session().is_authenticated());
    assert!(storage.raw("token").is_none());
    assert_eq!(
        resolve(AppRoute::Dashboard, &gw.session().snapshot()),
        AppRoute::Login
    );
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // 端口 9 (discard) 上没有监听者
    let session = Rc::new(SessionStore::new(MemoryStorage::new(), StorageKeys::default()));
    let gw = ClinicGateway::new(
        ConsoleConfig::new("http://127.0.0.1:9/api"),
        ReqwestHttpClient::new(),
        session,
    );
    let err = gw.list_clinics().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Network);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_logout_failure_keeps_session() {
    let server = MockServer::start().await;
    mount_login(&server, "super_admins").await;

    Mock::given(method("GET"))
        .and(path("/api/logout"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Logged out" })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let gw = gateway(&server, &storage);
    gw.login("root", "password1").await.unwrap();

    let err = gw.logout().await.unwrap_err();
    assert_eq!(err.status, ErrorStatus::Server);
    assert_eq!(err.message(), "boom");
    assert!(gw.session().is_authenticated());
    assert_eq!(storage.raw("token").as_deref(), Some("live-token"));

    gw.logout().await.unwrap();
    assert!(!gw.session().is_authenticated());
    assert!(storage.raw("token").is_none());
    assert!(storage.raw("userDetails").is_none());
}
