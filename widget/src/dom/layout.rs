//! [`WidgetLayout`] over the widget container's inline style.

use web_sys::HtmlElement;

use crate::consts::MINIMIZED_CLASS;
use crate::geometry::{Position, Size};
use crate::placement::WidgetLayout;
use crate::storage::Visibility;

/// Positions the container with `left`/`top` (or `right`/`bottom` when
/// anchored) and toggles the minimized presentation.
#[derive(Debug, Clone)]
pub struct DomLayout {
    container: HtmlElement,
    open_button: HtmlElement,
}

impl DomLayout {
    pub fn new(container: HtmlElement, open_button: HtmlElement) -> Self {
        Self { container, open_button }
    }

    fn set_edges(&self, left: &str, top: &str, right: &str, bottom: &str) {
        let style = self.container.style();
        let _ = style.set_property("left", left);
        let _ = style.set_property("top", top);
        let _ = style.set_property("right", right);
        let _ = style.set_property("bottom", bottom);
    }
}

impl WidgetLayout for DomLayout {
    fn viewport(&self) -> Size {
        let Some(window) = web_sys::window() else {
            return Size::default();
        };
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Size::new(width, height)
    }

    fn widget_size(&self) -> Size {
        Size::new(f64::from(self.container.offset_width()), f64::from(self.container.offset_height()))
    }

    fn rendered_position(&self) -> Position {
        let rect = self.container.get_bounding_client_rect();
        Position::new(rect.left(), rect.top())
    }

    fn apply_position(&self, position: Position) {
        self.set_edges(&format!("{}px", position.left), &format!("{}px", position.top), "auto", "auto");
    }

    fn anchor_corner(&self, inset: f64) {
        let inset = format!("{inset}px");
        self.set_edges("auto", "auto", &inset, &inset);
    }

    fn present(&self, visibility: Visibility) {
        let visible = visibility.is_visible();
        let _ = self.container.class_list().toggle_with_force(MINIMIZED_CLASS, !visible);
        let _ = self.open_button.class_list().toggle_with_force(MINIMIZED_CLASS, visible);
        let _ = self.container.set_attribute("aria-hidden", if visible { "false" } else { "true" });
        let _ = self.open_button.set_attribute("aria-expanded", if visible { "true" } else { "false" });
    }
}
