//! 基础信息表单组件
//!
//! 负责名称、城市、地址、URL 名称、颜色与 Logo 的 UI 渲染。

use clinic_console_shared::{LogoFile, ValidationError};
use js_sys::Uint8Array;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

use super::form_state::ClinicFormState;
use crate::components::field::{TextField, field_error};

async fn read_logo(file: File) -> Result<LogoFile, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    Ok(LogoFile {
        file_name: file.name(),
        content_type: file.type_(),
        bytes: Uint8Array::new(&buffer).to_vec(),
    })
}

#[component]
pub fn BasicInfoForm(
    state: ClinicFormState,
    errors: RwSignal<Option<ValidationError>>,
    /// 编辑模式下显示电话字段，Logo 可不选
    editing: bool,
) -> impl IntoView {
    let logo_error = field_error(errors, "logo");

    let on_logo = move |ev: leptos::ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            state.logo.set(None);
            return;
        };
        spawn_local(async move {
            match read_logo(file).await {
                Ok(logo) => state.logo.set(Some(logo)),
                Err(e) => {
                    warn!(error = ?e, "failed to read logo file");
                    state.logo.set(None);
                }
            }
        });
    };

    view! {
        <div class="grid grid-cols-2 gap-4">
            <TextField label="Name (Arabic)" id="name_ar" value=state.name_ar errors=errors />
            <TextField label="Name (English)" id="name_en" value=state.name_en errors=errors />
        </div>
        <div class="grid grid-cols-2 gap-4">
            <TextField label="Address (Arabic)" id="address_ar" value=state.address_ar errors=errors />
            <TextField label="Address (English)" id="address_en" value=state.address_en errors=errors />
        </div>
        <div class="grid grid-cols-2 gap-4">
            <TextField label="City ID" id="city_id" value=state.city_id errors=errors input_type="number" />
            <TextField label="URL Name" id="url_name" value=state.url_name errors=errors placeholder="my-clinic" />
        </div>
        {editing.then(|| view! {
            <TextField label="Telephone" id="telephone" value=state.telephone errors=errors input_type="tel" />
        })}
        <div class="grid grid-cols-2 gap-4">
            <div class="form-control">
                <label for="color" class="label">
                    <span class="label-text">"Color"</span>
                </label>
                <input
                    id="color"
                    type="color"
                    on:input=move |ev| state.color.set(event_target_value(&ev))
                    prop:value=move || state.color.get()
                    class="input input-bordered w-full"
                />
            </div>
            <div class="form-control">
                <label for="logo" class="label">
                    <span class="label-text">
                        {if editing { "Logo (leave empty to keep)" } else { "Logo" }}
                    </span>
                </label>
                <input
                    id="logo"
                    type="file"
                    accept="image/*"
                    on:change=on_logo
                    class="file-input file-input-bordered w-full"
                />
                {move || logo_error.get().map(|msg| view! {
                    <label class="label">
                        <span class="label-text-alt text-error">{msg}</span>
                    </label>
                })}
            </div>
        </div>
    }
}
