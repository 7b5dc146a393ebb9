//! 诊所表单（新建与编辑共用）

mod basic_info_form;
mod contacts_section;
mod form_state;
mod requirements_section;

use basic_info_form::BasicInfoForm;
use clinic_console_shared::ValidationError;
use contacts_section::ContactsSection;
pub use form_state::ClinicFormState;
use leptos::prelude::*;
use requirements_section::RequirementsSection;

#[component]
pub fn ClinicForm(
    state: ClinicFormState,
    errors: RwSignal<Option<ValidationError>>,
    submitting: ReadSignal<bool>,
    editing: bool,
    #[prop(into)] on_submit: Callback<()>,
    /// 编辑对话框中的取消按钮
    #[prop(optional, into)]
    on_cancel: Option<Callback<()>>,
) -> impl IntoView {
    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        on_submit.run(());
    };
    let label = if editing { "Save changes" } else { "Add clinic" };

    view! {
        <form on:submit=submit class="space-y-4">
            <BasicInfoForm state=state errors=errors editing=editing />
            <RequirementsSection state=state errors=errors />
            <ContactsSection state=state errors=errors />
            <div class="flex justify-end gap-2 pt-4">
                {on_cancel.map(|cancel| view! {
                    <button type="button" class="btn" on:click=move |_| cancel.run(())>"Cancel"</button>
                })}
                <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                    {move || if submitting.get() {
                        view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                    } else {
                        label.into_any()
                    }}
                </button>
            </div>
        </form>
    }
}
