use clinic_console::AppRoute;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{sign_out, use_console};
use crate::web::router::Link;

#[component]
pub fn UnauthorizedPage() -> impl IntoView {
    let ctx = use_console();
    let (signing_out, set_signing_out) = signal(false);

    // 会话清空后路由服务会重定向到登录页
    let on_sign_out = move |_| {
        set_signing_out.set(true);
        spawn_local(async move {
            sign_out(ctx).await;
            set_signing_out.set(false);
        });
    };

    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center space-y-4">
                <h1 class="text-6xl font-bold text-warning">"403"</h1>
                <p class="text-xl">"You are not authorized to view this page"</p>
                <div class="flex gap-2 justify-center">
                    <Link to=AppRoute::Dashboard class="btn btn-primary">"Back to dashboard"</Link>
                    {move || ctx.session.with(|s| s.is_authenticated).then(|| view! {
                        <button
                            class="btn btn-outline btn-error"
                            disabled=move || signing_out.get()
                            on:click=on_sign_out
                        >
                            "Sign out"
                        </button>
                    })}
                </div>
            </div>
        </div>
    }
}
