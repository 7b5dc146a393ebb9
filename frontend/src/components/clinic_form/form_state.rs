//! 诊所表单状态管理模块
//!
//! 将零散的 signal 整合为 `ClinicFormState` 结构体，负责：
//! - 数据的持有
//! - 数据的重置与回填
//! - 数据到提交载荷的转换

use clinic_console_shared::form::ClinicContacts;
use clinic_console_shared::{CreateClinicPayload, LogoFile, UpdateClinicPayload};
use leptos::prelude::*;

const DEFAULT_COLOR: &str = "#000000";

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct ClinicFormState {
    // 基础信息
    pub name_ar: RwSignal<String>,
    pub name_en: RwSignal<String>,
    pub city_id: RwSignal<String>,
    pub address_ar: RwSignal<String>,
    pub address_en: RwSignal<String>,
    pub telephone: RwSignal<String>,
    pub url_name: RwSignal<String>,
    pub color: RwSignal<String>,
    pub logo: RwSignal<Option<LogoFile>>,

    // 就诊要求
    pub requirements: RwSignal<Vec<String>>,

    // 联系方式
    pub phone: RwSignal<String>,
    pub whatsapp: RwSignal<String>,
    pub facebook: RwSignal<String>,
}

impl ClinicFormState {
    pub fn new() -> Self {
        Self {
            name_ar: RwSignal::new(String::new()),
            name_en: RwSignal::new(String::new()),
            city_id: RwSignal::new(String::new()),
            address_ar: RwSignal::new(String::new()),
            address_en: RwSignal::new(String::new()),
            telephone: RwSignal::new(String::new()),
            url_name: RwSignal::new(String::new()),
            color: RwSignal::new(DEFAULT_COLOR.to_string()),
            logo: RwSignal::new(None),
            requirements: RwSignal::new(vec![String::new()]),
            phone: RwSignal::new(String::new()),
            whatsapp: RwSignal::new(String::new()),
            facebook: RwSignal::new(String::new()),
        }
    }

    /// 重置表单到初始状态
    pub fn reset(&self) {
        self.load(&UpdateClinicPayload {
            color: DEFAULT_COLOR.to_string(),
            requirements: vec![String::new()],
            ..Default::default()
        });
    }

    /// 用已有诊所的数据回填（编辑时使用）
    pub fn load(&self, payload: &UpdateClinicPayload) {
        self.name_ar.set(payload.name_ar.clone());
        self.name_en.set(payload.name_en.clone());
        self.city_id.set(payload.city_id.clone());
        self.address_ar.set(payload.address_ar.clone());
        self.address_en.set(payload.address_en.clone());
        self.telephone.set(payload.telephone.clone());
        self.url_name.set(payload.url_name.clone());
        self.color.set(payload.color.clone());
        self.logo.set(payload.logo.clone());
        let requirements = if payload.requirements.is_empty() {
            vec![String::new()]
        } else {
            payload.requirements.clone()
        };
        self.requirements.set(requirements);
        self.phone.set(payload.contacts.phone.clone());
        self.whatsapp.set(payload.contacts.whatsapp.clone());
        self.facebook.set(payload.contacts.facebook.clone());
    }

    fn contacts(&self) -> ClinicContacts {
        ClinicContacts {
            phone: self.phone.get_untracked(),
            whatsapp: self.whatsapp.get_untracked(),
            facebook: self.facebook.get_untracked(),
        }
    }

    pub fn to_create(&self) -> CreateClinicPayload {
        CreateClinicPayload {
            name_ar: self.name_ar.get_untracked(),
            name_en: self.name_en.get_untracked(),
            city_id: self.city_id.get_untracked(),
            address_ar: self.address_ar.get_untracked(),
            address_en: self.address_en.get_untracked(),
            url_name: self.url_name.get_untracked(),
            color: self.color.get_untracked(),
            logo: self.logo.get_untracked(),
            requirements: self.requirements.get_untracked(),
            contacts: self.contacts(),
        }
    }

    pub fn to_update(&self) -> UpdateClinicPayload {
        UpdateClinicPayload {
            name_ar: self.name_ar.get_untracked(),
            name_en: self.name_en.get_untracked(),
            city_id: self.city_id.get_untracked(),
            address_ar: self.address_ar.get_untracked(),
            address_en: self.address_en.get_untracked(),
            telephone: self.telephone.get_untracked(),
            url_name: self.url_name.get_untracked(),
            color: self.color.get_untracked(),
            logo: self.logo.get_untracked(),
            requirements: self.requirements.get_untracked(),
            contacts: self.contacts(),
        }
    }
}
