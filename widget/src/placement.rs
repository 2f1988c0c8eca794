//! Placement manager: where the widget sits on screen and where it was left.
//!
//! The manager owns three concerns:
//!
//! - keeping the widget fully inside the viewport ([`PlacementManager::clamp`]),
//! - remembering the last position across page loads via a [`KeyValueStore`],
//! - the header drag gesture, tracked by [`DragState`] between pointer-down
//!   and pointer-up.
//!
//! Rendering is reached only through [`WidgetLayout`], so the same logic runs
//! against the DOM in the browser and against an in-memory fake in tests.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use crate::consts::DEFAULT_CORNER_INSET_PX;
use crate::geometry::{self, Point, Position, Size};
use crate::storage::{self, KeyValueStore, RestoreOutcome, Visibility};

/// Rendering surface the placement manager drives.
///
/// Methods take `&self`: the DOM is mutated through shared handles.
pub trait WidgetLayout {
    /// Current viewport size.
    fn viewport(&self) -> Size;

    /// Current rendered size of the widget.
    fn widget_size(&self) -> Size;

    /// Current rendered top-left corner of the widget.
    fn rendered_position(&self) -> Position;

    /// Pin the widget to explicit `left`/`top` coordinates.
    fn apply_position(&self, position: Position);

    /// Anchor the widget to the bottom-right corner with `inset` pixels of
    /// margin, dropping explicit coordinates.
    fn anchor_corner(&self, inset: f64);

    /// Switch between the open panel and the minimized launcher.
    fn present(&self, visibility: Visibility);
}

/// Tunables for placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    /// Margin used when anchoring to the default corner.
    pub corner_inset: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { corner_inset: DEFAULT_CORNER_INSET_PX }
    }
}

/// Header drag gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// The header is being dragged.
    Dragging {
        /// Pointer location at pointer-down.
        start_pointer: Point,
        /// Widget position at pointer-down.
        start_position: Position,
    },
}

/// Keeps the widget on screen and persists where the user left it.
pub struct PlacementManager<S, L> {
    store: S,
    layout: L,
    config: PlacementConfig,
    drag: DragState,
}

impl<S: KeyValueStore, L: WidgetLayout> PlacementManager<S, L> {
    pub fn new(store: S, layout: L) -> Self {
        Self::with_config(store, layout, PlacementConfig::default())
    }

    pub fn with_config(store: S, layout: L, config: PlacementConfig) -> Self {
        Self { store, layout, config, drag: DragState::Idle }
    }

    #[cfg(test)]
    pub(crate) fn layout(&self) -> &L {
        &self.layout
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Visibility as currently persisted.
    pub fn visibility(&self) -> Visibility {
        storage::load_visibility(&self.store)
    }

    /// Bound `(left, top)` to the current viewport and widget size.
    pub fn clamp(&self, left: f64, top: f64) -> Position {
        geometry::clamp(left, top, self.layout.viewport(), self.layout.widget_size())
    }

    /// Apply the saved position, clamped, if one decodes.
    ///
    /// `Missing` and `Unparsable` outcomes leave the widget untouched.
    pub fn restore(&self) -> RestoreOutcome {
        match storage::load_position(&self.store) {
            RestoreOutcome::Restored(saved) => {
                let clamped = self.clamp(saved.left, saved.top);
                self.layout.apply_position(clamped);
                RestoreOutcome::Restored(clamped)
            }
            RestoreOutcome::Unparsable(reason) => {
                log::debug!("ignoring saved chatbot position: {reason}");
                RestoreOutcome::Unparsable(reason)
            }
            RestoreOutcome::Missing => RestoreOutcome::Missing,
        }
    }

    /// Save the rendered position, overwriting any previous value.
    pub fn persist(&self) -> Position {
        let position = self.layout.rendered_position();
        if let Err(e) = storage::save_position(&self.store, position) {
            log::warn!("failed to save chatbot position: {e}");
        }
        position
    }

    /// Open the panel at its saved position, or the default corner.
    pub fn show(&self) -> Position {
        self.layout.present(Visibility::Visible);
        self.save_visibility(Visibility::Visible);

        if !self.restore().is_restored() {
            self.layout.anchor_corner(self.config.corner_inset);
        }

        // Layout may have changed size since the position was saved.
        self.reclamp()
    }

    /// Minimize the panel. The saved position is left alone.
    pub fn hide(&self) {
        self.layout.present(Visibility::Hidden);
        self.save_visibility(Visibility::Hidden);
    }

    /// Apply the persisted visibility on mount. Defaults to hidden.
    pub fn initialize(&self) -> Visibility {
        let visibility = self.visibility();
        match visibility {
            Visibility::Visible => {
                self.show();
            }
            Visibility::Hidden => self.hide(),
        }
        visibility
    }

    /// Start a header drag. Refused when the pointer went down on one of the
    /// header controls.
    pub fn begin_drag(&mut self, pointer: Point, on_control: bool) -> bool {
        if on_control {
            return false;
        }
        self.drag = DragState::Dragging { start_pointer: pointer, start_position: self.layout.rendered_position() };
        true
    }

    /// Follow the pointer during a drag. Nothing is persisted mid-drag.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Position> {
        let DragState::Dragging { start_pointer, start_position } = self.drag else {
            return None;
        };
        let target = start_position.offset(pointer.delta_from(start_pointer));
        let clamped = self.clamp(target.left, target.top);
        self.layout.apply_position(clamped);
        Some(clamped)
    }

    /// Finish a drag and persist where the widget ended up.
    pub fn end_drag(&mut self) -> Option<Position> {
        if self.drag == DragState::Idle {
            return None;
        }
        self.drag = DragState::Idle;
        Some(self.persist())
    }

    /// React to a viewport resize: while visible, pull the widget back on
    /// screen and save the corrected position.
    pub fn handle_resize(&self) -> Option<Position> {
        if !self.visibility().is_visible() {
            return None;
        }
        self.reclamp();
        Some(self.persist())
    }

    fn reclamp(&self) -> Position {
        let rendered = self.layout.rendered_position();
        let clamped = self.clamp(rendered.left, rendered.top);
        self.layout.apply_position(clamped);
        clamped
    }

    fn save_visibility(&self, visibility: Visibility) {
        if let Err(e) = storage::save_visibility(&self.store, visibility) {
            log::warn!("failed to save chatbot visibility: {e}");
        }
    }
}
