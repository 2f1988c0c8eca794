//! One-time wiring of the widget to the host page.
//!
//! DESIGN
//! ======
//! Every listener is an owned `gloo-events` handle kept in [`MountedWidget`];
//! dropping a handle removes the listener. The mounted widget lives in a
//! thread-local slot, which doubles as the "already bound" flag: a second
//! [`mount`] returns without touching the page.
//!
//! Document-level `mousemove`/`mouseup` handles exist only while a mouse drag
//! is active. They are released from inside the `mouseup` callback, so the
//! drop is deferred to a microtask instead of freeing the running closure.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, KeyboardEvent, MouseEvent, TouchEvent};

use super::elements::WidgetElements;
use super::layout::DomLayout;
use super::transcript::DomTranscript;
use super::transport::{BrowserTimer, FetchTransport};
use crate::consts::{CLOSE_BUTTON_ID, MINIMIZE_BUTTON_ID};
use crate::conversation::{ConversationChannel, is_submit_key};
use crate::geometry::Point;
use crate::placement::PlacementManager;
use crate::storage::{FallbackStore, LocalStore};

type Placement = PlacementManager<FallbackStore<LocalStore>, DomLayout>;
type Channel = ConversationChannel<FetchTransport, BrowserTimer, DomTranscript>;
type DragListeners = Rc<RefCell<Option<[EventListener; 2]>>>;

/// Why the widget could not be bound to the page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
    #[error("no document available")]
    NoDocument,

    #[error("missing element #{0}")]
    MissingElement(&'static str),

    #[error("element #{0} is not an input or textarea")]
    UnsupportedInput(&'static str),
}

/// Live widget state plus the listeners that drive it.
struct MountedWidget {
    _placement: Rc<RefCell<Placement>>,
    _channel: Rc<Channel>,
    _listeners: Vec<EventListener>,
    _drag: DragListeners,
}

thread_local! {
    static MOUNTED: RefCell<Option<MountedWidget>> = const { RefCell::new(None) };
}

/// Mount now, or once `DOMContentLoaded` fires if the page is still loading.
pub fn mount_when_ready() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::warn!("[chatbot] no document; widget disabled");
        return;
    };
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", |_| mount_or_warn()).forget();
    } else {
        mount_or_warn();
    }
}

fn mount_or_warn() {
    if let Err(e) = mount() {
        log::warn!("[chatbot] {e}; widget disabled");
    }
}

/// Bind the widget to the host page.
///
/// Returns `Ok(false)` when the widget was already mounted.
///
/// # Errors
///
/// Returns a [`MountError`] if the document or any required element is
/// unavailable. Nothing is bound in that case. Without `localStorage` the
/// widget still mounts; placement is then kept in memory only.
pub fn mount() -> Result<bool, MountError> {
    if MOUNTED.with(|slot| slot.borrow().is_some()) {
        return Ok(false);
    }

    let document = web_sys::window().and_then(|w| w.document()).ok_or(MountError::NoDocument)?;
    let elements = WidgetElements::locate(&document)?;
    let store = FallbackStore::from_open(LocalStore::open());

    let placement = Rc::new(RefCell::new(PlacementManager::new(
        store,
        DomLayout::new(elements.container.clone(), elements.open_button.clone()),
    )));
    placement.borrow().initialize();

    let channel = Rc::new(ConversationChannel::new(
        FetchTransport,
        BrowserTimer,
        DomTranscript::new(
            document.clone(),
            elements.messages.clone(),
            elements.input.clone(),
            elements.send_button.clone(),
            elements.spinner.clone(),
        ),
    ));
    log::debug!("[chatbot] session {}", channel.session_id());

    let drag: DragListeners = Rc::new(RefCell::new(None));
    let mut listeners = visibility_listeners(&elements, &placement);
    listeners.extend(send_listeners(&elements, &channel));
    listeners.extend(drag_listeners(&document, &elements, &placement, &drag));
    if let Some(window) = web_sys::window() {
        let placement = Rc::clone(&placement);
        listeners.push(EventListener::new(&window, "resize", move |_| {
            placement.borrow().handle_resize();
        }));
    }

    MOUNTED.with(|slot| {
        *slot.borrow_mut() =
            Some(MountedWidget { _placement: placement, _channel: channel, _listeners: listeners, _drag: drag });
    });
    Ok(true)
}

fn visibility_listeners(elements: &WidgetElements, placement: &Rc<RefCell<Placement>>) -> Vec<EventListener> {
    let open = {
        let placement = Rc::clone(placement);
        EventListener::new_with_options(
            &elements.open_button,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                placement.borrow().show();
            },
        )
    };
    let mut listeners = vec![open];
    for control in [&elements.minimize_button, &elements.close_button] {
        let placement = Rc::clone(placement);
        listeners.push(EventListener::new(control, "click", move |event| {
            event.stop_propagation();
            placement.borrow().hide();
        }));
    }
    listeners
}

fn send_listeners(elements: &WidgetElements, channel: &Rc<Channel>) -> Vec<EventListener> {
    let click = {
        let channel = Rc::clone(channel);
        EventListener::new(&elements.send_button, "click", move |_| submit(&channel))
    };
    let keydown = {
        let channel = Rc::clone(channel);
        EventListener::new_with_options(
            elements.input.element(),
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if is_submit_key(&key.key(), key.shift_key()) {
                    event.prevent_default();
                    submit(&channel);
                }
            },
        )
    };
    vec![click, keydown]
}

fn submit(channel: &Rc<Channel>) {
    let text = channel.view().input_value();
    let channel = Rc::clone(channel);
    wasm_bindgen_futures::spawn_local(async move {
        channel.send(&text).await;
    });
}

fn drag_listeners(
    document: &Document,
    elements: &WidgetElements,
    placement: &Rc<RefCell<Placement>>,
    drag: &DragListeners,
) -> Vec<EventListener> {
    let mousedown = {
        let placement = Rc::clone(placement);
        let drag = Rc::clone(drag);
        let document = document.clone();
        EventListener::new(&elements.header, "mousedown", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let pointer = Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
            if placement.borrow_mut().begin_drag(pointer, starts_on_control(event)) {
                set_text_selection(&document, false);
                *drag.borrow_mut() = Some(document_drag_listeners(&document, &placement, &drag));
            }
        })
    };

    let touchstart = {
        let placement = Rc::clone(placement);
        let document = document.clone();
        EventListener::new(&elements.header, "touchstart", move |event| {
            let Some(pointer) = first_touch(event) else {
                return;
            };
            if placement.borrow_mut().begin_drag(pointer, starts_on_control(event)) {
                set_text_selection(&document, false);
            }
        })
    };
    let touchmove = {
        let placement = Rc::clone(placement);
        EventListener::new(&elements.header, "touchmove", move |event| {
            if let Some(pointer) = first_touch(event) {
                placement.borrow_mut().drag_to(pointer);
            }
        })
    };
    let touchend = {
        let placement = Rc::clone(placement);
        let document = document.clone();
        EventListener::new(&elements.header, "touchend", move |_| {
            if placement.borrow_mut().end_drag().is_some() {
                set_text_selection(&document, true);
            }
        })
    };

    vec![mousedown, touchstart, touchmove, touchend]
}

fn document_drag_listeners(
    document: &Document,
    placement: &Rc<RefCell<Placement>>,
    drag: &DragListeners,
) -> [EventListener; 2] {
    let mousemove = {
        let placement = Rc::clone(placement);
        EventListener::new(document, "mousemove", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            placement
                .borrow_mut()
                .drag_to(Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())));
        })
    };
    let mouseup = {
        let placement = Rc::clone(placement);
        let drag = Rc::clone(drag);
        let doc = document.clone();
        EventListener::new(document, "mouseup", move |_| {
            placement.borrow_mut().end_drag();
            set_text_selection(&doc, true);
            let released = drag.borrow_mut().take();
            wasm_bindgen_futures::spawn_local(async move {
                drop(released);
            });
        })
    };
    [mousemove, mouseup]
}

/// Whether the event started inside the minimize or close control.
fn starts_on_control(event: &Event) -> bool {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return false;
    };
    [CLOSE_BUTTON_ID, MINIMIZE_BUTTON_ID]
        .iter()
        .any(|id| target.closest(&format!("#{id}")).ok().flatten().is_some())
}

fn first_touch(event: &Event) -> Option<Point> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(Point::new(f64::from(touch.client_x()), f64::from(touch.client_y())))
}

fn set_text_selection(document: &Document, enabled: bool) {
    let Some(body) = document.body() else {
        return;
    };
    let style = body.style();
    if enabled {
        let _ = style.remove_property("user-select");
    } else {
        let _ = style.set_property("user-select", "none");
    }
}
