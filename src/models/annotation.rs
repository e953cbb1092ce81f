use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::NormalizedPoint;

/// Bounding box in the service's 0..=1000 grid, `[x0, y0, x1, y1]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    /// Corner the overlay marker is pinned to.
    pub fn anchor(&self) -> NormalizedPoint {
        NormalizedPoint::new(self.x0, self.y0)
    }

    pub fn far_corner(&self) -> NormalizedPoint {
        NormalizedPoint::new(self.x1, self.y1)
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x0, y0, x1, y1]: [i32; 4]) -> Self {
        BoundingBox { x0, y0, x1, y1 }
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x0, bbox.y0, bbox.x1, bbox.y1]
    }
}

/// One annotation as reported by the service, before it is attached to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "box_2d", alias = "box2d", alias = "box")]
    pub bbox: BoundingBox,
    #[serde(rename = "mistakes", alias = "mistake", default)]
    pub mistake_description: String,
}

/// An annotation attached to a page. The id is minted locally at attach time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub id: Uuid,
    pub text: String,
    pub bbox: BoundingBox,
    pub mistake_description: String,
}

impl Annotation {
    pub fn attach(record: AnnotationRecord) -> Self {
        Annotation {
            id: Uuid::new_v4(),
            text: record.text,
            bbox: record.bbox,
            mistake_description: record.mistake_description,
        }
    }

    /// Only flagged regions get a marker; an empty description means the
    /// service looked at the region and found nothing wrong.
    pub fn is_selectable(&self) -> bool {
        !self.mistake_description.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_decodes_wire_names() {
        let record: AnnotationRecord = serde_json::from_str(
            r#"{"text": "b=2", "box_2d": [773, 105, 836, 143], "mistakes": ""}"#,
        )
        .unwrap();

        assert_eq!(record.bbox, BoundingBox { x0: 773, y0: 105, x1: 836, y1: 143 });
        assert!(record.mistake_description.is_empty());
    }

    #[test]
    fn test_record_tolerates_renamed_and_missing_fields() {
        let record: AnnotationRecord =
            serde_json::from_str(r#"{"box2d": [1, 2, 3, 4], "confidence": 0.9}"#).unwrap();

        assert_eq!(record.text, "");
        assert_eq!(record.bbox.anchor(), NormalizedPoint::new(1, 2));
    }

    #[test]
    fn test_short_box_is_rejected() {
        let result: Result<AnnotationRecord, _> =
            serde_json::from_str(r#"{"text": "x", "box_2d": [1, 2, 3], "mistakes": ""}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_attach_mints_distinct_ids() {
        let record = AnnotationRecord {
            text: "m = 2".to_string(),
            bbox: BoundingBox::from([480, 104, 713, 214]),
            mistake_description: "slope is 1".to_string(),
        };

        let a = Annotation::attach(record.clone());
        let b = Annotation::attach(record);
        assert_ne!(a.id, b.id);
        assert!(a.is_selectable());
    }

    #[test]
    fn test_whitespace_description_is_not_selectable() {
        let annotation = Annotation::attach(AnnotationRecord {
            text: "y = mx + b".to_string(),
            bbox: BoundingBox::from([687, 96, 777, 135]),
            mistake_description: "  ".to_string(),
        });
        assert!(!annotation.is_selectable());
    }
}
