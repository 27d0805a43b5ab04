use super::super::{Model, Msg};
use super::utils::debounce;
use shared::AnalysisState;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(display_data) = model.session.display_data() else {
        return html! {};
    };

    let link = ctx.link().clone();
    let analyzing = model.session.state().is_analyzing();

    html! {
        <div id="preview-container">
            <img id="actual-image-preview" src={display_data.to_string()} alt="Uploaded X-Ray" />
            <div class="button-container">
                <button
                    id="remove-btn"
                    class="analyze-btn"
                    style="background-color: var(--clear-color);"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::ClearImage)
                    })}
                >
                    <i class="fa-solid fa-trash"></i>{" Remove"}
                </button>
                <button
                    class="analyze-btn"
                    style="background-color: var(--primary-color);"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Analyze)
                    })}
                    disabled={analyzing}
                >
                    { render_analyze_button_content(model.session.state()) }
                </button>
            </div>
        </div>
    }
}

fn render_analyze_button_content(state: &AnalysisState) -> Html {
    match state {
        AnalysisState::Analyzing => {
            html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> }
        }
        AnalysisState::ResultReady { .. } => {
            html! { <><i class="fa-solid fa-rotate-right"></i>{" Analyze Again"}</> }
        }
        _ => html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Analyze Image"}</> },
    }
}
