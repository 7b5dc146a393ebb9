//! 受保护页面的公共外壳：侧边栏 + 顶栏

use clinic_console::sidebar_links;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{logout, use_console};
use crate::web::router::{Link, use_router};

#[component]
pub fn Shell(#[prop(into)] title: String, children: Children) -> impl IntoView {
    let ctx = use_console();
    let router = use_router();
    let role = ctx.role();
    let (signing_out, set_signing_out) = signal(false);

    let user_name = move || {
        ctx.session
            .with(|s| s.user.as_ref().map(|u| u.name.clone()).unwrap_or_default())
    };

    let on_logout = move |_| {
        set_signing_out.set(true);
        spawn_local(async move {
            // 成功时会话变化会触发路由重定向；失败只记录日志，会话保留
            let _ = logout(ctx).await;
            set_signing_out.set(false);
        });
    };

    view! {
        <div class="drawer lg:drawer-open">
            <input id="sidebar" type="checkbox" class="drawer-toggle" />
            <div class="drawer-content min-h-screen bg-base-200 p-4 md:p-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl mb-6">
                    <div class="flex-1 gap-2">
                        <label for="sidebar" class="btn btn-ghost lg:hidden">"☰"</label>
                        <span class="text-xl font-bold px-2">{title}</span>
                    </div>
                    <div class="flex-none gap-2">
                        <span class="badge badge-neutral hidden md:inline-flex">
                            {user_name} " · " {move || role.get().unwrap_or_default()}
                        </span>
                        <button
                            on:click=on_logout
                            disabled=move || signing_out.get()
                            class="btn btn-outline btn-error"
                        >
                            "Logout"
                        </button>
                    </div>
                </div>
                <div class="max-w-7xl mx-auto space-y-8">{children()}</div>
            </div>
            <div class="drawer-side">
                <label for="sidebar" class="drawer-overlay"></label>
                <ul class="menu p-4 w-64 min-h-full bg-base-100">
                    <li class="menu-title">"Clinic Console"</li>
                    {move || {
                        let current = router.current_route().get();
                        sidebar_links(role.get().as_deref())
                            .into_iter()
                            .map(|link| {
                                let class = if link.route == current { "active" } else { "" };
                                view! {
                                    <li>
                                        <Link to=link.route class=class>{link.label}</Link>
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </div>
        </div>
    }
}
