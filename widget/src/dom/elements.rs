//! Host page element lookup.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

use super::mount::MountError;
use crate::consts::{
    CLOSE_BUTTON_ID, CONTAINER_ID, HEADER_ID, INPUT_ID, MESSAGES_ID, MINIMIZE_BUTTON_ID, OPEN_BUTTON_ID,
    SEND_BUTTON_ID, SPINNER_ID,
};

/// The message box: a single-line input or a textarea.
#[derive(Debug, Clone)]
pub enum InputField {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl InputField {
    pub fn value(&self) -> String {
        match self {
            Self::Input(el) => el.value(),
            Self::TextArea(el) => el.value(),
        }
    }

    pub fn set_value(&self, value: &str) {
        match self {
            Self::Input(el) => el.set_value(value),
            Self::TextArea(el) => el.set_value(value),
        }
    }

    pub fn element(&self) -> &HtmlElement {
        match self {
            Self::Input(el) => el,
            Self::TextArea(el) => el,
        }
    }
}

/// Every element the widget needs from the host page.
#[derive(Debug, Clone)]
pub struct WidgetElements {
    pub container: HtmlElement,
    pub open_button: HtmlElement,
    pub minimize_button: HtmlElement,
    pub close_button: HtmlElement,
    pub header: HtmlElement,
    pub messages: HtmlElement,
    pub input: InputField,
    pub send_button: HtmlElement,
    pub spinner: HtmlElement,
}

impl WidgetElements {
    /// Look up all widget elements by id.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::MissingElement`] naming the first id that is
    /// absent, or [`MountError::UnsupportedInput`] when the message box is
    /// neither an `<input>` nor a `<textarea>`.
    pub fn locate(document: &Document) -> Result<Self, MountError> {
        Ok(Self {
            container: by_id(document, CONTAINER_ID)?,
            open_button: by_id(document, OPEN_BUTTON_ID)?,
            minimize_button: by_id(document, MINIMIZE_BUTTON_ID)?,
            close_button: by_id(document, CLOSE_BUTTON_ID)?,
            header: by_id(document, HEADER_ID)?,
            messages: by_id(document, MESSAGES_ID)?,
            input: input_by_id(document, INPUT_ID)?,
            send_button: by_id(document, SEND_BUTTON_ID)?,
            spinner: by_id(document, SPINNER_ID)?,
        })
    }
}

fn by_id(document: &Document, id: &'static str) -> Result<HtmlElement, MountError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or(MountError::MissingElement(id))
}

fn input_by_id(document: &Document, id: &'static str) -> Result<InputField, MountError> {
    let el = document.get_element_by_id(id).ok_or(MountError::MissingElement(id))?;
    let el = match el.dyn_into::<HtmlInputElement>() {
        Ok(input) => return Ok(InputField::Input(input)),
        Err(el) => el,
    };
    el.dyn_into::<HtmlTextAreaElement>()
        .map(InputField::TextArea)
        .map_err(|_| MountError::UnsupportedInput(id))
}
