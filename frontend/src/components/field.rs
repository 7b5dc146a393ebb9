//! 带校验提示的表单输入

use clinic_console_shared::ValidationError;
use leptos::prelude::*;

/// 指定字段的校验错误文本
pub fn field_error(errors: RwSignal<Option<ValidationError>>, field: &'static str) -> Signal<Option<String>> {
    Signal::derive(move || {
        errors.with(|e| {
            e.as_ref()
                .and_then(|e| e.field(field))
                .map(|f| f.message.clone())
        })
    })
}

#[component]
pub fn TextField(
    #[prop(into)] label: String,
    /// 输入框 id，同时也是校验错误的字段名
    id: &'static str,
    value: RwSignal<String>,
    errors: RwSignal<Option<ValidationError>>,
    #[prop(optional)] input_type: Option<&'static str>,
    #[prop(optional, into)] placeholder: String,
) -> impl IntoView {
    let error = field_error(errors, id);

    view! {
        <div class="form-control">
            <label for=id class="label">
                <span class="label-text">{label}</span>
            </label>
            <input
                id=id
                type=input_type.unwrap_or("text")
                placeholder=placeholder
                on:input=move |ev| value.set(event_target_value(&ev))
                prop:value=move || value.get()
                class=move || if error.with(Option::is_some) {
                    "input input-bordered input-error w-full"
                } else {
                    "input input-bordered w-full"
                }
            />
            {move || error.get().map(|msg| view! {
                <label class="label">
                    <span class="label-text-alt text-error">{msg}</span>
                </label>
            })}
        </div>
    }
}
