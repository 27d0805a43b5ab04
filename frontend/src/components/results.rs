use super::super::Model;
use shared::display::DisplayEntry;
use shared::{AnalysisState, ResultView};
use yew::prelude::*;

pub fn render_results(model: &Model) -> Html {
    let Some(display_data) = model.session.display_data() else {
        return html! {};
    };

    let body = match model.session.state() {
        AnalysisState::Analyzing => render_analyzing(),
        AnalysisState::ResultReady { .. } => html! {
            <div class="results-grid">
                <div class="analyzed-image">
                    <img src={display_data.to_string()} alt="Analyzed X-Ray" />
                </div>
                <div>
                    { render_simulated_banner(model.session.is_simulated()) }
                    { model.session.result_view().map(render_view).unwrap_or_default() }
                </div>
            </div>
        },
        _ => html! {
            <p class="no-results-message">{"Click \"Analyze Image\" to process the X-Ray"}</p>
        },
    };

    html! {
        <section class="results-container">
            <div class="result-header">
                <h2>{"Analysis Results"}</h2>
            </div>
            { body }
        </section>
    }
}

fn render_analyzing() -> Html {
    html! {
        <div class="loading-results">
            <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
            <p>{"Analyzing X-Ray image..."}</p>
            <p class="subtitle">{"The model is processing your image. This may take a few moments."}</p>
        </div>
    }
}

fn render_simulated_banner(is_simulated: bool) -> Html {
    if !is_simulated {
        return html! {};
    }
    html! {
        <div class="error-message simulated-banner">
            <i class="fa-solid fa-triangle-exclamation"></i>
            <p>{"The classifier could not be reached. These results are simulated and must not be used for diagnosis."}</p>
        </div>
    }
}

fn render_view(view: ResultView) -> Html {
    match view {
        ResultView::Healthy => html! {
            <div class="healthy-lungs">
                <i class="fa-solid fa-circle-check fa-2x"></i>
                <h3>{"Healthy Lungs"}</h3>
                <p>{"None of the screened conditions were detected in this X-ray."}</p>
            </div>
        },
        ResultView::Findings(entries) => html! {
            <div class="detailed-results">
                <h3>{"Detected Conditions:"}</h3>
                <div class="result-bars">
                    { for entries.iter().map(render_entry) }
                </div>
            </div>
        },
    }
}

fn render_entry(entry: &DisplayEntry) -> Html {
    let percentage = entry.percent();

    html! {
        <div class={classes!("result-item", entry.detected.then_some("detected"))}>
            <div class="result-label">
                <span>{ &entry.label }</span>
                if entry.detected {
                    <span class="detected-badge">
                        <i class="fa-solid fa-check"></i>{" Detected"}
                    </span>
                }
            </div>
            <div class="result-bar-container">
                <div class="result-bar" style={format!("width: {}%", percentage)}></div>
            </div>
            <div class="result-value">{ format!("{}%", percentage) }</div>
            <p class="result-finding">{ entry.finding() }</p>
        </div>
    }
}
