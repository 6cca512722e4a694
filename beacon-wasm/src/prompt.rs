//! Feedback prompt rendered into the page

use std::cell::RefCell;

use beacon_core::{BeaconError, PromptConfig, PromptHost, Result};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlFormElement,
    HtmlTextAreaElement, Window,
};

use crate::describe;
use crate::handle::TrackerSlot;

const PROMPT_ID: &str = "beacon-feedback-prompt";

const CONTAINER_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("bottom", "20px"),
    ("right", "20px"),
    ("z-index", "2147483647"),
    ("max-width", "320px"),
    ("padding", "16px"),
    ("background", "#ffffff"),
    ("border", "1px solid #d0d0d0"),
    ("border-radius", "8px"),
    ("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.15)"),
    ("font-family", "sans-serif"),
    ("font-size", "14px"),
];

/// Renders the prompt as a fixed-position box with a form
pub struct DomPromptHost {
    window: Window,
    document: Document,
    slot: TrackerSlot,
    element: RefCell<Option<Element>>,
}

impl DomPromptHost {
    pub fn new(window: Window, document: Document, slot: TrackerSlot) -> Self {
        Self {
            window,
            document,
            slot,
            element: RefCell::new(None),
        }
    }

    fn create<T: JsCast>(&self, tag: &str) -> Result<T> {
        self.document
            .create_element(tag)
            .map_err(|e| BeaconError::Dom(describe(&e)))?
            .dyn_into::<T>()
            .map_err(|_| BeaconError::Dom(format!("<{}> has an unexpected type", tag)))
    }

    fn build(&self, copy: &PromptConfig) -> Result<HtmlElement> {
        let dom = |e: wasm_bindgen::JsValue| BeaconError::Dom(describe(&e));

        let container: HtmlElement = self.create("div")?;
        container.set_id(PROMPT_ID);
        let style = container.style();
        for (name, value) in CONTAINER_STYLE {
            style.set_property(name, value).map_err(dom)?;
        }

        let question: HtmlElement = self.create("p")?;
        question.set_text_content(Some(&copy.question));
        question.style().set_property("margin", "0 0 8px").map_err(dom)?;

        let textarea: HtmlTextAreaElement = self.create("textarea")?;
        textarea.set_placeholder(&copy.placeholder);
        textarea.set_rows(3);
        textarea.style().set_property("width", "100%").map_err(dom)?;

        let submit: HtmlButtonElement = self.create("button")?;
        submit.set_type("submit");
        submit.set_text_content(Some(&copy.submit_label));

        let close: HtmlButtonElement = self.create("button")?;
        close.set_type("button");
        close.set_text_content(Some(&copy.close_label));
        close.style().set_property("margin-left", "8px").map_err(dom)?;

        let form: HtmlFormElement = self.create("form")?;
        form.append_child(&textarea).map_err(dom)?;
        form.append_child(&submit).map_err(dom)?;
        form.append_child(&close).map_err(dom)?;

        container.append_child(&question).map_err(dom)?;
        container.append_child(&form).map_err(dom)?;

        let slot = self.slot.clone();
        let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            let text = textarea.value();
            if let Some(outcome) = slot.with(|tracker| tracker.submit_feedback(&text)) {
                debug!(?outcome, "prompt submitted");
            }
        });
        form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())
            .map_err(dom)?;
        // The page keeps the prompt's handlers for as long as the prompt exists
        on_submit.forget();

        let slot = self.slot.clone();
        let on_close = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            slot.with(|tracker| tracker.close_prompt());
        });
        close
            .add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())
            .map_err(dom)?;
        on_close.forget();

        Ok(container)
    }
}

impl PromptHost for DomPromptHost {
    fn show(&self, copy: &PromptConfig) -> Result<()> {
        let body = self
            .document
            .body()
            .ok_or_else(|| BeaconError::Dom("document has no body".to_string()))?;

        let container = self.build(copy)?;
        body.append_child(&container)
            .map_err(|e| BeaconError::Dom(describe(&e)))?;
        *self.element.borrow_mut() = Some(container.into());
        Ok(())
    }

    fn remove(&self) {
        if let Some(element) = self.element.borrow_mut().take() {
            element.remove();
        }
    }

    fn confirm(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            warn!("failed to show confirmation: {}", describe(&e));
        }
    }
}
