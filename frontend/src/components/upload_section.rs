use super::super::{Model, Msg};
use super::preview_area::render_preview_area;
use super::utils::{click_file_input, debounce, first_file};
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <section id="upload" class="upload-section">
            <h2>{"Upload Chest X-Ray Image"}</h2>
            {
                if model.session.display_data().is_some() {
                    render_preview_area(model, ctx)
                } else {
                    render_file_input_area(model, ctx)
                }
            }
        </section>
    }
}

fn render_file_input_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().as_ref().and_then(first_file);

        input.set_value("");
        file.map(Msg::FileChosen)
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept="image/*"
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Drag and drop your X-Ray image here, paste it, or"}</p>
                    <button
                        id="upload-button"
                        class="analyze-btn"
                        onclick={debounce(300, click_file_input)}
                    >
                        <i class="fa-solid fa-upload"></i>{" Browse Files"}
                    </button>
                    <p class="file-types">{"Supports: JPEG, PNG, WEBP"}</p>
                </div>
            </div>
        </>
    }
}
