//! 操作结果提示（右上角 toast）

use clinic_console::{ConsoleError, ErrorStatus};
use leptos::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(context: &str, error: &ConsoleError) -> Self {
        Self {
            text: format!("{}: {}", context, describe(error)),
            is_error: true,
        }
    }
}

/// 按错误类别给出面向用户的文本
pub fn describe(error: &ConsoleError) -> String {
    match error.status {
        ErrorStatus::Network => format!("{} (check your connection and retry)", error.message()),
        ErrorStatus::Authentication => "Your session has expired, please sign in again".to_string(),
        ErrorStatus::Authorization => "You are not allowed to do this".to_string(),
        ErrorStatus::NotFound => "The requested resource was not found".to_string(),
        ErrorStatus::MalformedResponse => "The server sent an unexpected response".to_string(),
        ErrorStatus::Validation | ErrorStatus::Server => error.message().to_string(),
    }
}

/// 3 秒后自动消失的提示框
#[component]
pub fn NoticeToast(notice: RwSignal<Option<Notice>>) -> impl IntoView {
    Effect::new(move |_| {
        if notice.with(Option::is_some) {
            set_timeout(move || notice.set(None), std::time::Duration::from_secs(3));
        }
    });

    move || {
        notice.get().map(|n| {
            let class = if n.is_error {
                "alert alert-error shadow-lg"
            } else {
                "alert alert-success shadow-lg"
            };
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div class=class>
                        <span>{n.text}</span>
                    </div>
                </div>
            }
        })
    }
}
