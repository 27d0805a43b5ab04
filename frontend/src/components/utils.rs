use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::FileList;
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || {
            inner_callback();
        }));
    })
}

/// Only one X-ray is analysed at a time; extra files in a selection are ignored.
/// The media type is checked later by intake so a rejection can be reported.
pub fn first_file(file_list: &FileList) -> Option<GlooFile> {
    if file_list.length() > 1 {
        log::warn!("{} files supplied, using the first one", file_list.length());
    }
    file_list.item(0).map(GlooFile::from)
}

pub fn click_file_input() {
    use wasm_bindgen::JsCast;

    let input = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id("file-input"))
        .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok());

    if let Some(input) = input {
        input.click();
    }
}
