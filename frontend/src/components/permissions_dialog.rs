//! 管理员权限编辑对话框
//!
//! 每个可授予的权限对应一个复选框；提交时覆盖该管理员的全部权限，全部不选即全部撤销。

use clinic_console_shared::{Admin, PermissionGrant};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_console;
use crate::components::notice::Notice;

#[component]
pub fn PermissionsDialog(
    /// 正在编辑的管理员；`None` 时对话框关闭
    target: RwSignal<Option<Admin>>,
    notice: RwSignal<Option<Notice>>,
) -> impl IntoView {
    let ctx = use_console();
    let granted = RwSignal::new(Vec::<PermissionGrant>::new());
    let (saving, set_saving) = signal(false);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if target.with(Option::is_some) {
                granted.set(Vec::new());
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let toggle = move |grant: PermissionGrant, on: bool| {
        granted.update(|list| {
            list.retain(|g| *g != grant);
            if on {
                list.push(grant);
            }
        });
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Some(admin) = target.get_untracked() else {
            return;
        };
        let grants = granted.get_untracked();
        set_saving.set(true);
        spawn_local(async move {
            match ctx.gateway().set_permissions(admin.id, &grants).await {
                Ok(_) => {
                    notice.set(Some(Notice::success(format!(
                        "Permissions updated for {}",
                        admin.name
                    ))));
                    target.set(None);
                }
                Err(e) => notice.set(Some(Notice::failure("Updating permissions failed", &e))),
            }
            set_saving.set(false);
        });
    };

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| target.set(None)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">
                    "Permissions: " {move || target.with(|t| t.as_ref().map(|a| a.name.clone()))}
                </h3>
                <form on:submit=on_submit class="space-y-4 pt-4">
                    {PermissionGrant::CATALOGUE
                        .into_iter()
                        .map(|(grant, label)| {
                            view! {
                                <label class="label cursor-pointer justify-start gap-4">
                                    <input
                                        type="checkbox"
                                        class="checkbox checkbox-primary"
                                        prop:checked=move || granted.with(|g| g.contains(&grant))
                                        on:change=move |ev| toggle(grant, event_target_checked(&ev))
                                    />
                                    <span class="label-text">{label}</span>
                                </label>
                            }
                        })
                        .collect_view()}
                    <div class="modal-action">
                        <button type="button" class="btn" on:click=move |_| target.set(None)>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                            {move || if saving.get() {
                                view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                            } else {
                                "Save".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </dialog>
    }
}
