//! Form payloads for the clinic and admin screens.
//!
//! Each payload checks its required fields before submission and knows how
//! to lay itself out as multipart fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ADMIN_ROLE_ID;
use crate::protocol::{FormField, FormValue};

/// Contact types used when creating a clinic.
const CREATE_CONTACT_TYPES: [u32; 3] = [1, 2, 3];
/// Contact types used when updating a clinic (phone, whatsapp, facebook).
const UPDATE_CONTACT_TYPES: [u32; 3] = [1, 4, 5];

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Required-field failures collected from one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.summary())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == name)
    }
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn required(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.fail(field, message);
        }
    }

    fn fail(&mut self, field: &'static str, message: &str) {
        self.errors.push(FieldError {
            field,
            message: message.to_string(),
        });
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// An uploaded logo image.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LogoFile {
    fn to_field(&self) -> FormField {
        FormField {
            name: "logo".to_string(),
            value: FormValue::File {
                file_name: self.file_name.clone(),
                content_type: self.content_type.clone(),
                bytes: self.bytes.clone(),
            },
        }
    }
}

/// Phone, WhatsApp and Facebook contacts of a clinic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClinicContacts {
    pub phone: String,
    pub whatsapp: String,
    pub facebook: String,
}

impl ClinicContacts {
    fn check(&self, c: &mut Checker) {
        c.required("phone", &self.phone, "Phone number is required");
        c.required("whatsapp", &self.whatsapp, "WhatsApp number is required");
        c.required("facebook", &self.facebook, "Facebook URL is required");
    }

    fn push_fields(&self, types: [u32; 3], fields: &mut Vec<FormField>) {
        let values = [&self.phone, &self.whatsapp, &self.facebook];
        for (type_id, value) in types.into_iter().zip(values) {
            fields.push(FormField::text(
                format!("contactInfos[{}][value]", type_id),
                value.as_str(),
            ));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateClinicPayload {
    pub name_ar: String,
    pub name_en: String,
    pub city_id: String,
    pub address_ar: String,
    pub address_en: String,
    pub url_name: String,
    pub color: String,
    pub logo: Option<LogoFile>,
    pub requirements: Vec<String>,
    pub contacts: ClinicContacts,
}

impl CreateClinicPayload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut c = Checker::default();
        c.required("name_ar", &self.name_ar, "Arabic name is required");
        c.required("name_en", &self.name_en, "English name is required");
        c.required("city_id", &self.city_id, "City ID is required");
        c.required("address_ar", &self.address_ar, "Address in Arabic is required");
        c.required("address_en", &self.address_en, "Address in English is required");
        c.required("url_name", &self.url_name, "URL Name is required");
        c.required("color", &self.color, "Color is required");
        if self.logo.is_none() {
            c.fail("logo", "Logo is required");
        }
        if self.requirements.iter().all(|r| r.trim().is_empty()) {
            c.fail("requirements", "At least one requirement is required");
        }
        self.contacts.check(&mut c);
        c.finish()
    }

    pub fn to_form(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("name_ar", self.name_ar.as_str()),
            FormField::text("name_en", self.name_en.as_str()),
            FormField::text("city_id", self.city_id.as_str()),
            FormField::text("address_ar", self.address_ar.as_str()),
            FormField::text("address_en", self.address_en.as_str()),
            FormField::text("url_name", self.url_name.as_str()),
            FormField::text("color", self.color.as_str()),
        ];
        if let Some(logo) = &self.logo {
            fields.push(logo.to_field());
        }
        push_requirements(&self.requirements, &mut fields);
        self.contacts.push_fields(CREATE_CONTACT_TYPES, &mut fields);
        fields
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateClinicPayload {
    pub name_ar: String,
    pub name_en: String,
    pub city_id: String,
    pub address_ar: String,
    pub address_en: String,
    pub telephone: String,
    pub url_name: String,
    pub color: String,
    /// Replaced only when a new file was picked.
    pub logo: Option<LogoFile>,
    pub requirements: Vec<String>,
    pub contacts: ClinicContacts,
}

impl UpdateClinicPayload {
    /// Pre-fills the edit form from a listed clinic.
    pub fn from_clinic(clinic: &crate::Clinic) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name_ar: text(&clinic.name_ar),
            name_en: text(&clinic.name_en),
            city_id: clinic
                .city_id
                .as_ref()
                .map(|c| c.id.to_string())
                .unwrap_or_default(),
            address_ar: text(&clinic.address_ar),
            address_en: text(&clinic.address_en),
            telephone: text(&clinic.telephone),
            url_name: text(&clinic.url_name),
            color: clinic.color.clone().unwrap_or_else(|| "#000000".to_string()),
            logo: None,
            requirements: clinic.requirements.clone(),
            contacts: ClinicContacts {
                phone: clinic.contact(UPDATE_CONTACT_TYPES[0]).unwrap_or_default().to_string(),
                whatsapp: clinic.contact(UPDATE_CONTACT_TYPES[1]).unwrap_or_default().to_string(),
                facebook: clinic.contact(UPDATE_CONTACT_TYPES[2]).unwrap_or_default().to_string(),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut c = Checker::default();
        c.required("name_ar", &self.name_ar, "Arabic name is required");
        c.required("name_en", &self.name_en, "English name is required");
        c.required("city_id", &self.city_id, "City ID is required");
        c.required("address_ar", &self.address_ar, "Address in Arabic is required");
        c.required("address_en", &self.address_en, "Address in English is required");
        c.required("url_name", &self.url_name, "URL Name is required");
        c.required("color", &self.color, "Color is required");
        self.contacts.check(&mut c);
        c.finish()
    }

    pub fn to_form(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("name_ar", self.name_ar.as_str()),
            FormField::text("name_en", self.name_en.as_str()),
            FormField::text("city_id", self.city_id.as_str()),
            FormField::text("address_ar", self.address_ar.as_str()),
            FormField::text("address_en", self.address_en.as_str()),
            FormField::text("telephone", self.telephone.as_str()),
            FormField::text("url_name", self.url_name.as_str()),
            FormField::text("color", self.color.as_str()),
        ];
        if let Some(logo) = &self.logo {
            fields.push(logo.to_field());
        }
        self.contacts.push_fields(UPDATE_CONTACT_TYPES, &mut fields);
        push_requirements(&self.requirements, &mut fields);
        fields
    }
}

fn push_requirements(requirements: &[String], fields: &mut Vec<FormField>) {
    let non_blank = requirements.iter().filter(|r| !r.trim().is_empty());
    for (idx, requirement) in non_blank.enumerate() {
        fields.push(FormField::text(
            format!("requirements[{}]", idx),
            requirement.as_str(),
        ));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAdminPayload {
    pub username: String,
    pub password: String,
    pub city_id: String,
    pub role_id: String,
    pub name_ar: String,
    pub name_en: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    pub gender: String,
    pub clinic_id: String,
    pub specialization_id: String,
    pub description: String,
    pub birth_date: String,
}

impl Default for CreateAdminPayload {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            city_id: String::new(),
            role_id: ADMIN_ROLE_ID.to_string(),
            name_ar: String::new(),
            name_en: String::new(),
            phone_number: String::new(),
            email: String::new(),
            gender: "1".to_string(),
            clinic_id: String::new(),
            specialization_id: String::new(),
            description: String::new(),
            birth_date: String::new(),
        }
    }
}

impl CreateAdminPayload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut c = Checker::default();
        c.required("username", &self.username, "Username is required");
        if self.password.is_empty() {
            c.fail("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            c.fail("password", "Password must be at least 8 characters");
        }
        c.required("city_id", &self.city_id, "City ID is required");
        c.required("name_ar", &self.name_ar, "Arabic Name is required");
        c.required("name_en", &self.name_en, "English Name is required");
        c.required("phone_number", &self.phone_number, "Phone Number is required");
        if !self.email.trim().is_empty() && !looks_like_email(self.email.trim()) {
            c.fail("email", "Invalid Email");
        }
        c.required("gender", &self.gender, "Gender is required");
        c.required("clinic_id", &self.clinic_id, "Clinic ID is required");
        c.required(
            "specialization_id",
            &self.specialization_id,
            "Specialization ID is required",
        );
        c.required("description", &self.description, "Description is required");
        if self.birth_date.trim().is_empty() {
            c.fail("birth_date", "Birth date is required");
        } else if !is_iso_date(&self.birth_date) {
            c.fail("birth_date", "Birth date must be in the format YYYY-MM-DD");
        }
        c.finish()
    }

    pub fn to_form(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("username", self.username.as_str()),
            FormField::text("password", self.password.as_str()),
            FormField::text("city_id", self.city_id.as_str()),
            FormField::text("role_id", self.role_id.as_str()),
            FormField::text("name_ar", self.name_ar.as_str()),
            FormField::text("name_en", self.name_en.as_str()),
            FormField::text("phone_number", self.phone_number.as_str()),
        ];
        if !self.email.trim().is_empty() {
            fields.push(FormField::text("email", self.email.trim()));
        }
        fields.extend([
            FormField::text("gender", self.gender.as_str()),
            FormField::text("clinic_id", self.clinic_id.as_str()),
            FormField::text("specialization_id", self.specialization_id.as_str()),
            FormField::text("description", self.description.as_str()),
            FormField::text("birth_date", self.birth_date.as_str()),
        ]);
        fields
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

/// Strict `YYYY-MM-DD`, which is also a real calendar date.
fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
