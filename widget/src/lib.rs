//! # chatbot-widget
//!
//! Floating, draggable chat widget compiled to WebAssembly. The widget keeps
//! itself inside the viewport, remembers where the user left it, and relays
//! user messages to the `/chatbot/` endpoint, rendering the replies.
//!
//! The core is browser-agnostic and tested natively; the `hydrate` feature
//! adds the DOM binding and the wasm entry point.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Positions, sizes, and viewport clamping |
//! | [`storage`] | Key-value persistence of visibility and position |
//! | [`placement`] | Show/hide, restore/persist, drag, and resize handling |
//! | [`conversation`] | Turn protocol with timeout, history, transcript feedback |
//! | [`consts`] | Storage keys, endpoint, timings, texts, element IDs |
//! | `dom` | Host page binding (hydrate only) |

pub mod consts;
pub mod conversation;
#[cfg(feature = "hydrate")]
pub mod dom;
pub mod geometry;
pub mod placement;
pub mod storage;

/// Wasm entry point: install logging and mount the widget once the page is
/// ready.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    dom::mount_when_ready();
}
