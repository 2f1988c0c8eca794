//! [`TranscriptView`] over the message list, input, send control, and spinner.

use web_sys::{Document, HtmlElement};

use super::elements::InputField;
use crate::consts::HIDDEN_CLASS;
use crate::conversation::{Speaker, TranscriptView};

#[derive(Debug, Clone)]
pub struct DomTranscript {
    document: Document,
    messages: HtmlElement,
    input: InputField,
    send_button: HtmlElement,
    spinner: HtmlElement,
}

impl DomTranscript {
    pub fn new(
        document: Document,
        messages: HtmlElement,
        input: InputField,
        send_button: HtmlElement,
        spinner: HtmlElement,
    ) -> Self {
        Self { document, messages, input, send_button, spinner }
    }

    /// Current contents of the message box.
    pub fn input_value(&self) -> String {
        self.input.value()
    }
}

impl TranscriptView for DomTranscript {
    fn append(&self, speaker: Speaker, text: &str) {
        let (Ok(wrap), Ok(bubble)) = (self.document.create_element("div"), self.document.create_element("div"))
        else {
            return;
        };
        wrap.set_class_name(&format!("msg {}", speaker.class_name()));
        bubble.set_class_name("bubble");
        bubble.set_text_content(Some(text));
        let _ = wrap.append_child(&bubble);
        let _ = self.messages.append_child(&wrap);
        self.messages.set_scroll_top(self.messages.scroll_height());
    }

    fn clear_input(&self) {
        self.input.set_value("");
    }

    fn set_busy(&self, busy: bool) {
        let _ = self.send_button.toggle_attribute_with_force("disabled", busy);
        let _ = self.spinner.class_list().toggle_with_force(HIDDEN_CLASS, !busy);
    }
}
