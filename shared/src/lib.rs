use serde::{Deserialize, Serialize};

pub mod form;
pub mod protocol;

pub use form::{
    CreateAdminPayload, CreateClinicPayload, FieldError, LogoFile, UpdateClinicPayload,
    ValidationError,
};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const ROLE_SUPER_ADMINS: &str = "super_admins";
pub const ROLE_ADMINS: &str = "admins";

/// Role id the backend assigns to clinic administrators.
pub const ADMIN_ROLE_ID: u32 = 2;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// Resource tags group cached reads that are invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceTag {
    Clinic,
    Admin,
}

impl ResourceTag {
    pub const ALL: [ResourceTag; 2] = [ResourceTag::Clinic, ResourceTag::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceTag::Clinic => "Clinic",
            ResourceTag::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: u32,
    pub name: String,
}

/// Profile of the signed-in user, persisted next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub id: u32,
    pub name: String,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl UserDetails {
    pub fn role_name(&self) -> &str {
        &self.role.name
    }
}

/// Credentials posted to `/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of a successful login: the profile with the token alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    #[serde(flatten)]
    pub user: UserDetails,
    #[serde(default)]
    pub token: Option<String>,
}

/// Standard `{ data, message }` wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Acknowledgement returned by mutations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRef {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub communication_type_id: u32,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_ar: Option<String>,
    #[serde(default)]
    pub address_en: Option<String>,
    #[serde(default)]
    pub city_id: Option<CityRef>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub url_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub contact_information: Vec<ContactInfo>,
}

impl Clinic {
    /// Name shown in lists: the localized name, else the English one.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.name_en.as_deref())
            .or(self.name_ar.as_deref())
            .unwrap_or("")
    }

    pub fn contact(&self, communication_type_id: u32) -> Option<&str> {
        self.contact_information
            .iter()
            .find(|c| c.communication_type_id == communication_type_id)
            .map(|c| c.value.as_str())
    }
}

/// Case-insensitive match of `query` against clinic names and URL name.
///
/// An empty or blank query keeps every clinic.
pub fn filter_clinics<'a>(clinics: &'a [Clinic], query: &str) -> Vec<&'a Clinic> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return clinics.iter().collect();
    }
    clinics
        .iter()
        .filter(|c| {
            [&c.name, &c.name_en, &c.name_ar, &c.url_name]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminDetails {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: u32,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub city: Option<CityRef>,
    pub role: Role,
    #[serde(default)]
    pub details: Option<AdminDetails>,
}

/// A grantable admin permission as the backend encodes it:
/// `permissions[{slot}] = {permission_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub slot: u32,
    pub permission_id: u32,
}

impl PermissionGrant {
    pub const UPDATE_CLINIC: PermissionGrant = PermissionGrant {
        slot: 5,
        permission_id: 6,
    };
    pub const SHOW_CLINIC: PermissionGrant = PermissionGrant {
        slot: 7,
        permission_id: 8,
    };

    /// Permissions the console lets a super admin hand out.
    pub const CATALOGUE: [(PermissionGrant, &'static str); 2] = [
        (Self::UPDATE_CLINIC, "Update Clinic"),
        (Self::SHOW_CLINIC, "Show Clinic"),
    ];

    pub fn field_name(&self) -> String {
        format!("permissions[{}]", self.slot)
    }
}
