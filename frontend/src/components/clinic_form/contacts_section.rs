//! 联系方式：电话、WhatsApp、Facebook

use clinic_console_shared::ValidationError;
use leptos::prelude::*;

use super::form_state::ClinicFormState;
use crate::components::field::TextField;

#[component]
pub fn ContactsSection(
    state: ClinicFormState,
    errors: RwSignal<Option<ValidationError>>,
) -> impl IntoView {
    view! {
        <div class="divider text-sm">"Contact information"</div>
        <div class="grid grid-cols-2 gap-4">
            <TextField label="Phone" id="phone" value=state.phone errors=errors input_type="tel" />
            <TextField label="WhatsApp" id="whatsapp" value=state.whatsapp errors=errors input_type="tel" />
        </div>
        <TextField
            label="Facebook"
            id="facebook"
            value=state.facebook
            errors=errors
            input_type="url"
            placeholder="https://facebook.com/..."
        />
    }
}
