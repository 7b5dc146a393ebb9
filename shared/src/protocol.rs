use crate::{
    Ack, Admin, ApiEnvelope, Clinic, CreateAdminPayload, CreateClinicPayload, Credentials,
    LoginData, PermissionGrant, ResourceTag, UpdateClinicPayload,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Value of a single multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    /// The text value, or `None` for file parts.
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            FormValue::Text(v) => Some(v),
            FormValue::File { .. } => None,
        }
    }
}

/// Transport-independent request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(String),
    Form(Vec<FormField>),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(RequestBody::Json)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Reads declare the tag they provide; mutations declare the tags they invalidate.
pub trait Endpoint {
    /// The full response body returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Tag under which a successful read is cached.
    const PROVIDES: Option<ResourceTag> = None;
    /// Tags whose cached reads are dropped when this request succeeds.
    const INVALIDATES: &'static [ResourceTag] = &[];

    /// Path below the API base, starting with `/`.
    fn path(&self) -> String;

    fn body(&self) -> Result<RequestBody, serde_json::Error> {
        Ok(RequestBody::Empty)
    }
}

// =========================================================
// Request Definitions
// =========================================================

/// Exchange credentials for a token and profile
#[derive(Debug, Clone)]
pub struct LoginRequest(pub Credentials);

impl Endpoint for LoginRequest {
    type Response = ApiEnvelope<LoginData>;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/login".to_string()
    }

    fn body(&self) -> Result<RequestBody, serde_json::Error> {
        RequestBody::json(&self.0)
    }
}

/// End the server-side session
#[derive(Debug, Clone)]
pub struct LogoutRequest;

impl Endpoint for LogoutRequest {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/logout".to_string()
    }
}

/// List all clinics
#[derive(Debug, Clone)]
pub struct ListClinicsRequest;

impl Endpoint for ListClinicsRequest {
    type Response = ApiEnvelope<Vec<Clinic>>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: Option<ResourceTag> = Some(ResourceTag::Clinic);

    fn path(&self) -> String {
        "/clinic".to_string()
    }
}

/// Create a clinic (multipart, carries the logo)
#[derive(Debug, Clone)]
pub struct CreateClinicRequest(pub CreateClinicPayload);

impl Endpoint for CreateClinicRequest {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [ResourceTag] = &[ResourceTag::Clinic];

    fn path(&self) -> String {
        "/clinic".to_string()
    }

    fn body(&self) -> Result<RequestBody, serde_json::Error> {
        Ok(RequestBody::Form(self.0.to_form()))
    }
}

/// Update an existing clinic
#[derive(Debug, Clone)]
pub struct UpdateClinicRequest {
    pub clinic_id: u32,
    pub payload: UpdateClinicPayload,
}

impl Endpoint for UpdateClinicRequest {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Put;
    const INVALIDATES: &'static [ResourceTag] = &[ResourceTag::Clinic];

    fn path(&self) -> String {
        format!("/clinic/{}", self.clinic_id)
    }

    fn body(&self) -> Result<RequestBody, serde_json::Error> {
        Ok(RequestBody::Form(self.payload.to_form()))
    }
}

/// List actors holding a role (admins are role 2)
#[derive(Debug, Clone)]
pub struct ListAdminsRequest {
    pub role_id: u32,
}

impl Endpoint for ListAdminsRequest {
    type Response = ApiEnvelope<Vec<Admin>>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const PROVIDES: Option<ResourceTag> = Some(ResourceTag::Admin);

    fn path(&self) -> String {
        format!("/actor/{}", self.role_id)
    }
}

/// Create an admin account
#[derive(Debug, Clone)]
pub struct CreateAdminRequest(pub CreateAdminPayload);

impl Endpoint for CreateAdminRequest {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [ResourceTag] = &[ResourceTag::Admin];

    fn path(&self) -> String {
        "/actor".to_string()
    }

    fn body(&self) -> Result<RequestBody, serde_json::Error> {
        Ok(RequestBody::Form(self.0.to_form()))
    }
}

/// Replace the permissions granted to an admin
#[derive(Debug, Clone)]
pub struct SetPermissionsRequest {
    pub admin_id: u32,
    pub granted: Vec<PermissionGrant>,
}

impl Endpoint for SetPermissionsRequest {
    type Response = Ack;
    const METHOD: HttpMethod = HttpMethod::Post;
    const INVALIDATES: &'static [ResourceTag] = &[ResourceTag::Admin];

    fn path(&self) -> String {
        format!("/actor_permissions/{}", self.admin_id)
    }

    fn body(&self) -> Result<RequestBody, serde_json::Error> {
        let fields = self
            .granted
            .iter()
            .map(|g| FormField::text(g.field_name(), g.permission_id.to_string()))
            .collect();
        Ok(RequestBody::Form(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_and_tags() {
        assert_eq!(ListAdminsRequest { role_id: 2 }.path(), "/actor/2");
        assert_eq!(ListAdminsRequest::PROVIDES, Some(ResourceTag::Admin));
        assert_eq!(ListClinicsRequest::PROVIDES, Some(ResourceTag::Clinic));
        assert_eq!(LoginRequest::INVALIDATES, &[] as &[ResourceTag]);
        assert_eq!(SetPermissionsRequest::INVALIDATES, &[ResourceTag::Admin]);
    }

    #[test]
    fn permissions_are_encoded_by_slot() {
        let req = SetPermissionsRequest {
            admin_id: 9,
            granted: vec![PermissionGrant::UPDATE_CLINIC, PermissionGrant::SHOW_CLINIC],
        };
        assert_eq!(req.path(), "/actor_permissions/9");

        let RequestBody::Form(fields) = req.body().unwrap() else {
            panic!("expected form body");
        };
        let pairs: Vec<_> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.as_text().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("permissions[5]", "6"), ("permissions[7]", "8")]);
    }

    #[test]
    fn login_body_is_json_credentials() {
        let req = LoginRequest(Credentials {
            username: "root".into(),
            password: "secret".into(),
        });
        let RequestBody::Json(body) = req.body().unwrap() else {
            panic!("expected json body");
        };
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["username"], "root");
        assert_eq!(value["password"], "secret");
    }
}
