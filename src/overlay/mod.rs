//! Which annotation's popup is open on the page being viewed.

mod markers;

pub use markers::{page_overlays, OverlayMarker};

use uuid::Uuid;

use crate::models::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Closed,
    Open(Uuid),
}

/// Selection for the currently displayed page. Transient: it is never stored
/// with the document and does not survive a page change.
#[derive(Debug, Clone, Default)]
pub struct OverlaySelectionController {
    page_index: usize,
    state: SelectionState,
}

impl OverlaySelectionController {
    pub fn new(page_index: usize) -> Self {
        OverlaySelectionController {
            page_index,
            state: SelectionState::Closed,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn selected(&self) -> Option<Uuid> {
        match self.state {
            SelectionState::Open(id) => Some(id),
            SelectionState::Closed => None,
        }
    }

    pub fn is_open(&self, id: Uuid) -> bool {
        self.state == SelectionState::Open(id)
    }

    /// Re-tapping the open annotation closes it; tapping another switches
    /// straight to it. Taps on annotations that are not on `page`, or that
    /// carry no mistake, are ignored.
    pub fn tap_annotation(&mut self, page: &Page, id: Uuid) -> SelectionState {
        let selectable = page.annotation(id).is_some_and(|a| a.is_selectable());
        if !selectable {
            tracing::debug!("Ignoring tap on non-selectable annotation {}", id);
            return self.state;
        }

        self.state = match self.state {
            SelectionState::Open(current) if current == id => SelectionState::Closed,
            _ => SelectionState::Open(id),
        };
        self.state
    }

    pub fn tap_background(&mut self) -> SelectionState {
        self.state = SelectionState::Closed;
        self.state
    }

    pub fn change_page(&mut self, page_index: usize) -> SelectionState {
        self.page_index = page_index;
        self.state = SelectionState::Closed;
        self.state
    }
}
