use serde::Serialize;
use uuid::Uuid;

use crate::error::GeometryError;
use crate::geometry::{clamp_popup, to_display_point, Point, Size};
use crate::models::Page;
use crate::overlay::OverlaySelectionController;

/// What the renderer needs to draw one annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayMarker {
    pub annotation_id: Uuid,
    pub display_position: Point,
    pub description: String,
    /// Only selectable markers are drawn and tappable.
    pub is_selectable: bool,
    pub is_open: bool,
    /// Center of the detail popup, set only for the open marker.
    pub popup_center: Option<Point>,
}

/// Maps every annotation on `page` into a `viewport` whose width the page
/// fills. Recompute whenever the viewport or the displayed page changes.
///
/// The popup sits to the right of its marker and is then pulled back inside
/// the viewport.
pub fn page_overlays(
    page: &Page,
    viewport: Size,
    popup: Size,
    selection: &OverlaySelectionController,
) -> Result<Vec<OverlayMarker>, GeometryError> {
    let image = page.image().size();

    page.annotations()
        .iter()
        .map(|annotation| {
            let display_position = to_display_point(annotation.bbox.anchor(), image, viewport.width)?;
            let is_selectable = annotation.is_selectable();
            let is_open = is_selectable && selection.is_open(annotation.id);
            let popup_center = is_open.then(|| {
                let desired = Point::new(display_position.x + popup.width / 2.0, display_position.y);
                clamp_popup(desired, popup, viewport)
            });

            Ok(OverlayMarker {
                annotation_id: annotation.id,
                display_position,
                description: annotation.mistake_description.clone(),
                is_selectable,
                is_open,
                popup_center,
            })
        })
        .collect()
}
