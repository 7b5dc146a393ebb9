use clinic_console::RequestState;
use clinic_console_shared::{Clinic, UpdateClinicPayload, filter_clinics};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_console;
use crate::components::clinic_form::{ClinicForm, ClinicFormState};
use crate::components::layout::Shell;
use crate::components::notice::{Notice, NoticeToast, describe};

#[component]
pub fn ShowClinicPage() -> impl IntoView {
    let ctx = use_console();
    let clinics = RwSignal::new(RequestState::<Vec<Clinic>>::Pending);
    let query = RwSignal::new(String::new());
    let notice = RwSignal::new(None::<Notice>);

    // 编辑对话框
    let editing = RwSignal::new(None::<u32>);
    let state = ClinicFormState::new();
    let errors = RwSignal::new(None);
    let (saving, set_saving) = signal(false);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    let load_clinics = move || {
        clinics.set(RequestState::Pending);
        spawn_local(async move {
            clinics.set(ctx.gateway().list_clinics().await.into());
        });
    };
    load_clinics();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if editing.with(Option::is_some) {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let start_edit = move |clinic: Clinic| {
        state.load(&UpdateClinicPayload::from_clinic(&clinic));
        errors.set(None);
        editing.set(Some(clinic.id));
    };

    let on_save = move |_: ()| {
        let Some(clinic_id) = editing.get_untracked() else {
            return;
        };
        let payload = state.to_update();
        if let Err(e) = payload.validate() {
            errors.set(Some(e));
            return;
        }
        errors.set(None);
        set_saving.set(true);

        spawn_local(async move {
            match ctx.gateway().update_clinic(clinic_id, payload).await {
                Ok(_) => {
                    notice.set(Some(Notice::success("Clinic updated")));
                    editing.set(None);
                    load_clinics();
                }
                Err(e) => notice.set(Some(Notice::failure("Updating clinic failed", &e))),
            }
            set_saving.set(false);
        });
    };

    let rows = move || match clinics.get() {
        RequestState::Pending => view! {
            <tr>
                <td colspan="5" class="text-center py-8 text-base-content/50">
                    <span class="loading loading-spinner loading-md"></span> " Loading..."
                </td>
            </tr>
        }
        .into_any(),
        RequestState::Rejected(e) => view! {
            <tr>
                <td colspan="5" class="text-center py-8 text-error">
                    {describe(&e)} " "
                    <button class="btn btn-sm" on:click=move |_| load_clinics()>"Retry"</button>
                </td>
            </tr>
        }
        .into_any(),
        RequestState::Fulfilled(list) => {
            let visible: Vec<Clinic> = query.with(|q| filter_clinics(&list, q).into_iter().cloned().collect());
            if visible.is_empty() {
                view! {
                    <tr>
                        <td colspan="5" class="text-center py-8 text-base-content/50">"No clinics match."</td>
                    </tr>
                }
                .into_any()
            } else {
                visible
                    .into_iter()
                    .map(|clinic| clinic_row(clinic, start_edit))
                    .collect_view()
                    .into_any()
            }
        }
    };

    view! {
        <Shell title="Clinics">
            <NoticeToast notice=notice />

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between gap-4 p-6 pb-2">
                        <h3 class="card-title">"Clinics"</h3>
                        <input
                            type="search"
                            placeholder="Search by name or URL"
                            class="input input-bordered input-sm w-full max-w-xs"
                            on:input=move |ev| query.set(event_target_value(&ev))
                            prop:value=move || query.get()
                        />
                    </div>
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Name"</th>
                                    <th class="hidden md:table-cell">"Address"</th>
                                    <th class="hidden md:table-cell">"URL"</th>
                                    <th>"Status"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>{rows}</tbody>
                        </table>
                    </div>
                </div>
            </div>

            <dialog class="modal" node_ref=dialog_ref on:close=move |_| editing.set(None)>
                <div class="modal-box max-w-3xl">
                    <h3 class="font-bold text-lg pb-4">"Edit clinic"</h3>
                    <ClinicForm
                        state=state
                        errors=errors
                        submitting=saving
                        editing=true
                        on_submit=on_save
                        on_cancel=move |_: ()| editing.set(None)
                    />
                </div>
            </dialog>
        </Shell>
    }
}

fn clinic_row(clinic: Clinic, on_edit: impl Fn(Clinic) + Copy + 'static) -> impl IntoView {
    let name = clinic.display_name().to_string();
    let address = clinic
        .address
        .clone()
        .or_else(|| clinic.address_en.clone())
        .unwrap_or_default();
    let url_name = clinic.url_name.clone().unwrap_or_default();
    let active = clinic.is_active.unwrap_or(true);
    let color = clinic.color.clone().unwrap_or_else(|| "#000000".to_string());

    view! {
        <tr>
            <td>
                <div class="flex items-center gap-2 font-bold">
                    <span class="w-3 h-3 rounded-full" style:background-color=color></span>
                    {name}
                </div>
            </td>
            <td class="hidden md:table-cell">{address}</td>
            <td class="hidden md:table-cell font-mono text-sm opacity-70">{url_name}</td>
            <td>
                {if active {
                    view! { <span class="badge badge-success badge-outline">"Active"</span> }.into_any()
                } else {
                    view! { <span class="badge badge-ghost">"Inactive"</span> }.into_any()
                }}
            </td>
            <td>
                <button class="btn btn-ghost btn-sm" on:click=move |_| on_edit(clinic.clone())>
                    "Edit"
                </button>
            </td>
        </tr>
    }
}
