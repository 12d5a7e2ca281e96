// Small DOM helpers plus owned interval / timeout handles.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Blob, Document, HtmlAnchorElement, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, Url, Window,
};

use crate::error::{QuestError, QuestResult};

pub fn window() -> QuestResult<Window> {
    web_sys::window().ok_or(QuestError::NoWindow)
}

pub fn document() -> QuestResult<Document> {
    window()?.document().ok_or(QuestError::NoDocument)
}

pub fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn set_style(doc: &Document, id: &str, style: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_attribute("style", style).ok();
    }
}

/// Current value of an input, textarea or select.
pub fn field_value(doc: &Document, id: &str) -> Option<String> {
    let el = doc.get_element_by_id(id)?;
    value_of(&el)
}

pub fn value_of(el: &web_sys::Element) -> Option<String> {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        return Some(area.value());
    }
    el.dyn_ref::<HtmlSelectElement>().map(|s| s.value())
}

pub fn focus(doc: &Document, id: &str) {
    if let Some(el) = doc
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    {
        el.focus().ok();
    }
}

pub fn alert(message: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.alert_with_message(message);
    }
}

/// Offer `blob` as a file download through a temporary anchor.
pub fn download_blob(blob: &Blob, file_name: &str) -> QuestResult<()> {
    let doc = document()?;
    let url = Url::create_object_url_with_blob(blob).map_err(QuestError::from_js)?;
    let a: HtmlAnchorElement = doc
        .create_element("a")
        .map_err(QuestError::from_js)?
        .dyn_into()
        .map_err(|_| QuestError::Js("anchor element".into()))?;
    a.set_href(&url);
    a.set_download(file_name);
    a.set_attribute("style", "display:none").ok();
    let body = doc.body().ok_or(QuestError::MissingElement("body"))?;
    body.append_child(&a).map_err(QuestError::from_js)?;
    a.click();
    body.remove_child(&a).map_err(QuestError::from_js)?;
    Url::revoke_object_url(&url).map_err(QuestError::from_js)?;
    log::info!("download offered as {file_name}");
    Ok(())
}

/// A `setInterval` or `setTimeout` registration, cleared on drop.
pub struct Ticker {
    handle: i32,
    repeating: bool,
    _callback: Closure<dyn FnMut()>,
}

impl Ticker {
    pub fn every(ms: i32, f: impl FnMut() + 'static) -> QuestResult<Ticker> {
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let handle = window()?
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                ms,
            )
            .map_err(QuestError::from_js)?;
        Ok(Ticker {
            handle,
            repeating: true,
            _callback: callback,
        })
    }

    pub fn after(ms: i32, f: impl FnMut() + 'static) -> QuestResult<Ticker> {
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let handle = window()?
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                ms,
            )
            .map_err(QuestError::from_js)?;
        Ok(Ticker {
            handle,
            repeating: false,
            _callback: callback,
        })
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(w) = web_sys::window() {
            if self.repeating {
                w.clear_interval_with_handle(self.handle);
            } else {
                w.clear_timeout_with_handle(self.handle);
            }
        }
    }
}
