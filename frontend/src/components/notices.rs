use super::super::{Model, Msg, Toast};
use shared::NoticeLevel;
use yew::prelude::*;

pub fn render_toasts(model: &Model, ctx: &Context<Model>) -> Html {
    if model.toasts.is_empty() {
        return html! {};
    }

    html! {
        <div class="toast-stack">
            { for model.toasts.iter().map(|toast| render_toast(ctx, toast)) }
        </div>
    }
}

fn render_toast(ctx: &Context<Model>, toast: &Toast) -> Html {
    let id = toast.id;
    let (class, icon) = match toast.notice.level() {
        NoticeLevel::Info => ("toast-info", "fa-circle-info"),
        NoticeLevel::Success => ("toast-success", "fa-circle-check"),
        NoticeLevel::Warning => ("toast-warning", "fa-triangle-exclamation"),
        NoticeLevel::Error => ("toast-error", "fa-circle-exclamation"),
    };

    html! {
        <div class={classes!("toast", class)} key={id.to_string()}>
            <i class={classes!("fa-solid", icon)}></i>
            <div class="toast-body">
                <strong>{ toast.notice.title() }</strong>
                <p>{ toast.notice.message() }</p>
            </div>
            <button
                class="remove-btn"
                title="Dismiss"
                onclick={ctx.link().callback(move |_| Msg::DismissToast(id))}
            >
                <i class="fa-solid fa-times"></i>
            </button>
        </div>
    }
}

/// Banner shown while the classifier's health check reports it as down.
pub fn render_api_status(model: &Model) -> Html {
    match model.api_healthy {
        Some(false) => html! {
            <div class="error-message api-status">
                <i class="fa-solid fa-plug-circle-xmark"></i>
                <p>{"The classification service appears to be offline. Analyses may fall back to simulated results."}</p>
            </div>
        },
        _ => html! {},
    }
}
