//! 就诊要求列表：可增删的文本行，空行提交时忽略

use clinic_console_shared::ValidationError;
use leptos::prelude::*;

use super::form_state::ClinicFormState;
use crate::components::field::field_error;

#[component]
pub fn RequirementsSection(
    state: ClinicFormState,
    errors: RwSignal<Option<ValidationError>>,
) -> impl IntoView {
    let error = field_error(errors, "requirements");
    // 只在行数变化时重建列表
    let count = Memo::new(move |_| state.requirements.with(Vec::len));

    view! {
        <div class="form-control space-y-2">
            <label class="label">
                <span class="label-text">"Requirements"</span>
                <button
                    type="button"
                    class="btn btn-ghost btn-xs"
                    on:click=move |_| state.requirements.update(|r| r.push(String::new()))
                >
                    "+ Add"
                </button>
            </label>
            {move || {
                (0..count.get())
                    .map(|idx| {
                        view! {
                            <div class="flex gap-2">
                                <input
                                    type="text"
                                    class="input input-bordered w-full"
                                    placeholder=format!("Requirement {}", idx + 1)
                                    prop:value=move || {
                                        state.requirements.with(|r| r.get(idx).cloned().unwrap_or_default())
                                    }
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        state.requirements.update(|r| {
                                            if let Some(slot) = r.get_mut(idx) {
                                                *slot = value;
                                            }
                                        });
                                    }
                                />
                                <button
                                    type="button"
                                    class="btn btn-ghost btn-square"
                                    disabled=move || count.get() <= 1
                                    on:click=move |_| state.requirements.update(|r| {
                                        if idx < r.len() && r.len() > 1 {
                                            r.remove(idx);
                                        }
                                    })
                                >
                                    "✕"
                                </button>
                            </div>
                        }
                    })
                    .collect_view()
            }}
            {move || error.get().map(|msg| view! {
                <span class="label-text-alt text-error">{msg}</span>
            })}
        </div>
    }
}
