use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_console;
use crate::components::clinic_form::{ClinicForm, ClinicFormState};
use crate::components::layout::Shell;
use crate::components::notice::{Notice, NoticeToast};

#[component]
pub fn AddClinicPage() -> impl IntoView {
    let ctx = use_console();
    let state = ClinicFormState::new();
    let errors = RwSignal::new(None);
    let notice = RwSignal::new(None::<Notice>);
    let (submitting, set_submitting) = signal(false);

    let on_submit = move |_: ()| {
        let payload = state.to_create();
        // 提交前校验，字段错误直接显示在输入框下
        if let Err(e) = payload.validate() {
            errors.set(Some(e));
            return;
        }
        errors.set(None);
        set_submitting.set(true);

        spawn_local(async move {
            match ctx.gateway().create_clinic(payload).await {
                Ok(_) => {
                    notice.set(Some(Notice::success("Clinic added successfully")));
                    state.reset();
                }
                Err(e) => notice.set(Some(Notice::failure("Adding clinic failed", &e))),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <Shell title="Add Clinic">
            <NoticeToast notice=notice />
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"New clinic"</h3>
                    <ClinicForm
                        state=state
                        errors=errors
                        submitting=submitting
                        editing=false
                        on_submit=on_submit
                    />
                </div>
            </div>
        </Shell>
    }
}
