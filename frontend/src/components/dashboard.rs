use clinic_console::RequestState;
use clinic_console_shared::{Admin, Clinic, ROLE_ADMINS};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_console;
use crate::components::layout::Shell;
use crate::components::notice::{Notice, NoticeToast, describe};
use crate::components::permissions_dialog::PermissionsDialog;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let ctx = use_console();
    let role = ctx.role();

    let clinics = RwSignal::new(RequestState::<Vec<Clinic>>::Pending);
    let admins = RwSignal::new(RequestState::<Vec<Admin>>::Pending);
    let notice = RwSignal::new(None::<Notice>);
    let editing = RwSignal::new(None::<Admin>);

    // `admins` 角色看不到管理员列表
    let show_admins = move || role.get().as_deref() != Some(ROLE_ADMINS);

    let load_clinics = move || {
        clinics.set(RequestState::Pending);
        spawn_local(async move {
            clinics.set(ctx.gateway().list_clinics().await.into());
        });
    };

    let load_admins = move || {
        admins.set(RequestState::Pending);
        spawn_local(async move {
            admins.set(ctx.gateway().list_admins().await.into());
        });
    };

    // 初始加载
    load_clinics();
    Effect::new(move |_| {
        if show_admins() {
            load_admins();
        }
    });

    // 权限保存后对话框关闭，重新读取（写请求已使缓存失效）
    Effect::new(move |prev: Option<bool>| {
        let open = editing.with(Option::is_some);
        if prev == Some(true) && !open && show_admins() {
            load_admins();
        }
        open
    });

    let clinic_count = move || match clinics.get() {
        RequestState::Fulfilled(list) => list.len().to_string(),
        RequestState::Pending => "…".to_string(),
        RequestState::Rejected(_) => "-".to_string(),
    };
    let active_count = move || match clinics.get() {
        RequestState::Fulfilled(list) => list
            .iter()
            .filter(|c| c.is_active.unwrap_or(true))
            .count()
            .to_string(),
        RequestState::Pending => "…".to_string(),
        RequestState::Rejected(_) => "-".to_string(),
    };

    view! {
        <Shell title="Dashboard">
            <NoticeToast notice=notice />
            <PermissionsDialog target=editing notice=notice />

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"Clinics"</div>
                    <div class="stat-value text-primary">{clinic_count}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Active clinics"</div>
                    <div class="stat-value text-success">{active_count}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Signed in as"</div>
                    <div class="stat-value text-secondary text-2xl">
                        {move || role.get().unwrap_or_default()}
                    </div>
                </div>
            </div>

            {move || match clinics.get() {
                RequestState::Rejected(e) => Some(view! {
                    <div role="alert" class="alert alert-error">
                        <span>{describe(&e)}</span>
                        <button class="btn btn-sm" on:click=move |_| load_clinics()>"Retry"</button>
                    </div>
                }),
                _ => None,
            }}

            <Show when=show_admins>
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body p-0">
                        <div class="flex items-center justify-between p-6 pb-2">
                            <div>
                                <h3 class="card-title">"Admins"</h3>
                                <p class="text-base-content/70 text-sm">"Clinic administrators and their permissions."</p>
                            </div>
                            <button
                                on:click=move |_| load_admins()
                                disabled=move || matches!(admins.get(), RequestState::Pending)
                                class="btn btn-ghost btn-sm"
                            >
                                "Refresh"
                            </button>
                        </div>
                        <div class="overflow-x-auto w-full">
                            <table class="table table-zebra w-full">
                                <thead>
                                    <tr>
                                        <th>"Name"</th>
                                        <th>"Username"</th>
                                        <th class="hidden md:table-cell">"City"</th>
                                        <th class="hidden md:table-cell">"Phone"</th>
                                        <th class="hidden md:table-cell">"Email"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {move || match admins.get() {
                                        RequestState::Pending => view! {
                                            <tr>
                                                <td colspan="6" class="text-center py-8 text-base-content/50">
                                                    <span class="loading loading-spinner loading-md"></span> " Loading..."
                                                </td>
                                            </tr>
                                        }.into_any(),
                                        RequestState::Rejected(e) => view! {
                                            <tr>
                                                <td colspan="6" class="text-center py-8 text-error">{describe(&e)}</td>
                                            </tr>
                                        }.into_any(),
                                        RequestState::Fulfilled(list) if list.is_empty() => view! {
                                            <tr>
                                                <td colspan="6" class="text-center py-8 text-base-content/50">
                                                    "No admins yet."
                                                </td>
                                            </tr>
                                        }.into_any(),
                                        RequestState::Fulfilled(list) => list
                                            .into_iter()
                                            .map(|admin| admin_row(admin, editing))
                                            .collect_view()
                                            .into_any(),
                                    }}
                                </tbody>
                            </table>
                        </div>
                    </div>
                </div>
            </Show>
        </Shell>
    }
}

fn admin_row(admin: Admin, editing: RwSignal<Option<Admin>>) -> impl IntoView {
    let details = admin.details.clone().unwrap_or_default();
    let city = admin
        .city
        .as_ref()
        .and_then(|c| c.name.clone())
        .unwrap_or_default();
    let name = admin.name.clone();
    let username = admin.username.clone();

    view! {
        <tr>
            <td class="font-bold">{name}</td>
            <td class="font-mono text-sm">{username}</td>
            <td class="hidden md:table-cell">{city}</td>
            <td class="hidden md:table-cell">{details.phone_number.unwrap_or_default()}</td>
            <td class="hidden md:table-cell">{details.email.unwrap_or_default()}</td>
            <td>
                <button class="btn btn-ghost btn-sm" on:click=move |_| editing.set(Some(admin.clone()))>
                    "Permissions"
                </button>
            </td>
        </tr>
    }
}
