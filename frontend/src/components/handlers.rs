use super::super::{Model, Msg, Toast};
use super::utils::first_file;
use crate::api::BrowserFile;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use gloo_timers::future::sleep;
use shared::intake;
use shared::{
    Classifier, ClassificationResult, ClassifierError, ClassifyRequest, Generation, IntakeApplied,
    IntakeTicket, Notice, RejectionReason, UploadedImage,
};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

const TOAST_DURATION_MS: u32 = 4_000;

pub fn handle_file_chosen(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    let ticket = model.session.begin_intake();
    let link = ctx.link().clone();

    spawn_local(async move {
        let outcome = intake::submit(BrowserFile::from(file)).await;
        link.send_message(Msg::IntakeFinished(ticket, outcome));
    });

    false
}

pub fn handle_intake_finished(
    model: &mut Model,
    ctx: &Context<Model>,
    ticket: IntakeTicket,
    outcome: Result<UploadedImage<BrowserFile>, RejectionReason>,
) -> bool {
    match model.session.apply_intake(ticket, outcome) {
        IntakeApplied::Stale => false,
        IntakeApplied::Rejected => true,
        IntakeApplied::Accepted(scheduled) => {
            // Dropping the previous timer cancels the replaced image's auto-analysis.
            model.auto_analyze_timeout = scheduled.map(|scheduled| {
                let link = ctx.link().clone();
                let millis = u32::try_from(scheduled.delay.as_millis()).unwrap_or(u32::MAX);
                Timeout::new(millis, move || {
                    link.send_message(Msg::ScheduledAnalyze(scheduled.generation));
                })
            });
            true
        }
    }
}

pub fn handle_clear_image(model: &mut Model) -> bool {
    model.auto_analyze_timeout = None;
    model.session.clear();
    true
}

pub fn handle_analyze(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.auto_analyze_timeout = None;
    match model.session.analyze() {
        Some(request) => {
            send_classify_request(model, ctx, request);
            true
        }
        None => false,
    }
}

pub fn handle_scheduled_analyze(
    model: &mut Model,
    ctx: &Context<Model>,
    generation: Generation,
) -> bool {
    model.auto_analyze_timeout = None;
    match model.session.start_scheduled(generation) {
        Some(request) => {
            send_classify_request(model, ctx, request);
            true
        }
        None => false,
    }
}

pub fn handle_classified(
    model: &mut Model,
    ctx: &Context<Model>,
    generation: Generation,
    outcome: Result<Vec<ClassificationResult>, ClassifierError>,
) -> bool {
    if let Some(retry) = model.session.apply_classification(generation, outcome) {
        send_classify_request(model, ctx, retry);
    }
    true
}

pub fn handle_health_checked(model: &mut Model, healthy: bool) -> bool {
    model.api_healthy = Some(healthy);
    if !healthy {
        model.session.notify(Notice::ApiUnavailable);
    }
    true
}

pub fn handle_dismiss_toast(model: &mut Model, id: u64) -> bool {
    let before = model.toasts.len();
    model.toasts.retain(|toast| toast.id != id);
    model.toasts.len() != before
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file) = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|file_list| first_file(&file_list))
    {
        ctx.link().send_message(Msg::FileChosen(file));
    }

    true
}

pub fn handle_paste(ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(file) = event
        .clipboard_data()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|file_list| first_file(&file_list))
    {
        event.prevent_default();
        ctx.link().send_message(Msg::FileChosen(file));
    }
    false
}

pub fn check_api_health(model: &Model, ctx: &Context<Model>) {
    let client = Rc::clone(&model.client);
    let link = ctx.link().clone();

    spawn_local(async move {
        let healthy = client.check_health().await;
        link.send_message(Msg::HealthChecked(healthy));
    });
}

/// Moves notices raised by the session into toasts.
pub fn flush_notices(model: &mut Model, ctx: &Context<Model>) -> bool {
    let notices = model.session.take_notices();
    if notices.is_empty() {
        return false;
    }

    for notice in notices {
        let id = model.next_toast_id;
        model.next_toast_id += 1;

        let link = ctx.link().clone();
        let dismiss = Timeout::new(TOAST_DURATION_MS, move || {
            link.send_message(Msg::DismissToast(id));
        });
        model.toasts.push(Toast {
            id,
            notice,
            _dismiss: dismiss,
        });
    }

    true
}

fn send_classify_request(
    model: &Model,
    ctx: &Context<Model>,
    request: ClassifyRequest<BrowserFile>,
) {
    let client = Rc::clone(&model.client);
    let link = ctx.link().clone();

    spawn_local(async move {
        if let Some(delay) = request.delay {
            sleep(delay).await;
        }
        let outcome = client.classify(&request.file).await;
        link.send_message(Msg::Classified(request.generation, outcome));
    });
}
