mod api;
mod components;

use api::{BrowserFile, GlooTransport};
use components::handlers;
use components::notices::{render_api_status, render_toasts};
use components::results::render_results;
use components::upload_section::render_upload_section;
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use shared::{
    AnalysisSession, ClassificationResult, ClassifierClient, ClassifierConfig, ClassifierError,
    Generation, IntakeTicket, Notice, RejectionReason, SessionConfig, UploadedImage,
};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

// Toast shown for a session notice; dropping it cancels the dismiss timer.
struct Toast {
    id: u64,
    notice: Notice,
    _dismiss: Timeout,
}

// Yew msg components
enum Msg {
    // Intake
    FileChosen(GlooFile),
    IntakeFinished(IntakeTicket, Result<UploadedImage<BrowserFile>, RejectionReason>),
    ClearImage,

    // Analysis
    Analyze,
    ScheduledAnalyze(Generation),
    Classified(Generation, Result<Vec<ClassificationResult>, ClassifierError>),
    HealthChecked(bool),

    // UI states
    DismissToast(u64),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Main component
struct Model {
    session: AnalysisSession<BrowserFile>,
    client: Rc<ClassifierClient<GlooTransport>>,
    toasts: Vec<Toast>,
    next_toast_id: u64,
    api_healthy: Option<bool>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
    auto_analyze_timeout: Option<Timeout>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = ClassifierConfig::with_override(option_env!("LUNGSCAN_API_URL"));
        log::info!("Using classifier at {}", config.base_url);

        let mut model = Self {
            session: AnalysisSession::new(SessionConfig::default()),
            client: Rc::new(ClassifierClient::new(GlooTransport, config)),
            toasts: Vec::new(),
            next_toast_id: 0,
            api_healthy: None,
            is_dragging: false,
            paste_listener: None,
            auto_analyze_timeout: None,
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        handlers::check_api_health(&model, ctx);
        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let render = match msg {
            // Intake
            Msg::FileChosen(file) => handlers::handle_file_chosen(self, ctx, file),
            Msg::IntakeFinished(ticket, outcome) => {
                handlers::handle_intake_finished(self, ctx, ticket, outcome)
            }
            Msg::ClearImage => handlers::handle_clear_image(self),

            // Analysis
            Msg::Analyze => handlers::handle_analyze(self, ctx),
            Msg::ScheduledAnalyze(generation) => {
                handlers::handle_scheduled_analyze(self, ctx, generation)
            }
            Msg::Classified(generation, outcome) => {
                handlers::handle_classified(self, ctx, generation, outcome)
            }
            Msg::HealthChecked(healthy) => handlers::handle_health_checked(self, healthy),

            // UI states
            Msg::DismissToast(id) => handlers::handle_dismiss_toast(self, id),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // Input events
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(ctx, event),
        };

        handlers::flush_notices(self, ctx) || render
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                <header class="app-header">
                    <h1><i class="fa-solid fa-lungs"></i>{" LungAI Diagnostics"}</h1>
                    <p class="subtitle">{"Chest X-ray screening for six thoracic conditions"}</p>
                    { self.service_badge() }
                </header>
                { render_api_status(self) }

                <main class="main-content">
                    { render_upload_section(self, ctx) }
                    { render_results(self) }
                </main>

                { render_toasts(self, ctx) }

                <footer class="app-footer">
                    <p>{"LungAI Diagnostics | Research demo, not a medical device"}</p>
                </footer>
            </div>
        }
    }
}

impl Model {
    fn service_badge(&self) -> Html {
        let (class, label) = match self.api_healthy {
            None => ("service-badge pending", "Checking classifier..."),
            Some(true) => ("service-badge online", "Classifier online"),
            Some(false) => ("service-badge offline", "Classifier offline"),
        };
        html! { <span class={class}>{ label }</span> }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
