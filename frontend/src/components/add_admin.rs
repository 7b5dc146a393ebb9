//! 新建管理员页面

use clinic_console_shared::{CreateAdminPayload, ValidationError};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_console;
use crate::components::field::{TextField, field_error};
use crate::components::layout::Shell;
use crate::components::notice::{Notice, NoticeToast};

/// 管理员表单状态
#[derive(Clone, Copy)]
struct AdminFormState {
    username: RwSignal<String>,
    password: RwSignal<String>,
    city_id: RwSignal<String>,
    name_ar: RwSignal<String>,
    name_en: RwSignal<String>,
    phone_number: RwSignal<String>,
    email: RwSignal<String>,
    gender: RwSignal<String>,
    clinic_id: RwSignal<String>,
    specialization_id: RwSignal<String>,
    description: RwSignal<String>,
    birth_date: RwSignal<String>,
}

impl AdminFormState {
    fn new() -> Self {
        let defaults = CreateAdminPayload::default();
        Self {
            username: RwSignal::new(defaults.username),
            password: RwSignal::new(defaults.password),
            city_id: RwSignal::new(defaults.city_id),
            name_ar: RwSignal::new(defaults.name_ar),
            name_en: RwSignal::new(defaults.name_en),
            phone_number: RwSignal::new(defaults.phone_number),
            email: RwSignal::new(defaults.email),
            gender: RwSignal::new(defaults.gender),
            clinic_id: RwSignal::new(defaults.clinic_id),
            specialization_id: RwSignal::new(defaults.specialization_id),
            description: RwSignal::new(defaults.description),
            birth_date: RwSignal::new(defaults.birth_date),
        }
    }

    fn reset(&self) {
        let defaults = CreateAdminPayload::default();
        self.username.set(defaults.username);
        self.password.set(defaults.password);
        self.city_id.set(defaults.city_id);
        self.name_ar.set(defaults.name_ar);
        self.name_en.set(defaults.name_en);
        self.phone_number.set(defaults.phone_number);
        self.email.set(defaults.email);
        self.gender.set(defaults.gender);
        self.clinic_id.set(defaults.clinic_id);
        self.specialization_id.set(defaults.specialization_id);
        self.description.set(defaults.description);
        self.birth_date.set(defaults.birth_date);
    }

    fn to_payload(&self) -> CreateAdminPayload {
        CreateAdminPayload {
            username: self.username.get_untracked(),
            password: self.password.get_untracked(),
            city_id: self.city_id.get_untracked(),
            name_ar: self.name_ar.get_untracked(),
            name_en: self.name_en.get_untracked(),
            phone_number: self.phone_number.get_untracked(),
            email: self.email.get_untracked(),
            gender: self.gender.get_untracked(),
            clinic_id: self.clinic_id.get_untracked(),
            specialization_id: self.specialization_id.get_untracked(),
            description: self.description.get_untracked(),
            birth_date: self.birth_date.get_untracked(),
            ..CreateAdminPayload::default()
        }
    }
}

#[component]
pub fn AddAdminPage() -> impl IntoView {
    let ctx = use_console();
    let state = AdminFormState::new();
    let errors = RwSignal::new(None::<ValidationError>);
    let notice = RwSignal::new(None::<Notice>);
    let (submitting, set_submitting) = signal(false);
    let description_error = field_error(errors, "description");

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let payload = state.to_payload();
        if let Err(e) = payload.validate() {
            errors.set(Some(e));
            return;
        }
        errors.set(None);
        set_submitting.set(true);

        spawn_local(async move {
            match ctx.gateway().create_admin(payload).await {
                Ok(_) => {
                    notice.set(Some(Notice::success("Admin added successfully")));
                    state.reset();
                }
                Err(e) => notice.set(Some(Notice::failure("Adding admin failed", &e))),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <Shell title="Add Admin">
            <NoticeToast notice=notice />
            <div class="card bg-base-100 shadow-xl">
                <form class="card-body space-y-4" on:submit=on_submit>
                    <h3 class="card-title">"New admin"</h3>
                    <div class="grid grid-cols-2 gap-4">
                        <TextField label="Username" id="username" value=state.username errors=errors />
                        <TextField label="Password" id="password" value=state.password errors=errors input_type="password" />
                    </div>
                    <div class="grid grid-cols-2 gap-4">
                        <TextField label="Name (Arabic)" id="name_ar" value=state.name_ar errors=errors />
                        <TextField label="Name (English)" id="name_en" value=state.name_en errors=errors />
                    </div>
                    <div class="grid grid-cols-2 gap-4">
                        <TextField label="Phone Number" id="phone_number" value=state.phone_number errors=errors input_type="tel" />
                        <TextField label="Email (optional)" id="email" value=state.email errors=errors input_type="email" />
                    </div>
                    <div class="grid grid-cols-2 gap-4">
                        <div class="form-control">
                            <label for="gender" class="label">
                                <span class="label-text">"Gender"</span>
                            </label>
                            <select
                                id="gender"
                                class="select select-bordered w-full"
                                on:change=move |ev| state.gender.set(event_target_value(&ev))
                                prop:value=move || state.gender.get()
                            >
                                <option value="1">"Male"</option>
                                <option value="2">"Female"</option>
                            </select>
                        </div>
                        <TextField label="Birth Date" id="birth_date" value=state.birth_date errors=errors input_type="date" />
                    </div>
                    <div class="grid grid-cols-3 gap-4">
                        <TextField label="City ID" id="city_id" value=state.city_id errors=errors input_type="number" />
                        <TextField label="Clinic ID" id="clinic_id" value=state.clinic_id errors=errors input_type="number" />
                        <TextField label="Specialization ID" id="specialization_id" value=state.specialization_id errors=errors input_type="number" />
                    </div>
                    <div class="form-control">
                        <label for="description" class="label">
                            <span class="label-text">"Description"</span>
                        </label>
                        <textarea
                            id="description"
                            class="textarea textarea-bordered"
                            on:input=move |ev| state.description.set(event_target_value(&ev))
                            prop:value=move || state.description.get()
                        ></textarea>
                        {move || description_error.get().map(|msg| view! {
                            <span class="label-text-alt text-error">{msg}</span>
                        })}
                    </div>
                    <div class="flex justify-end pt-4">
                        <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                            {move || if submitting.get() {
                                view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                            } else {
                                "Add admin".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </Shell>
    }
}
