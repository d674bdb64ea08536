//! Pin and geometry extraction for KiCad symbol libraries.
//!
//! The pipeline is:
//!
//! 1. [`kicad::scanner::BlockScanner`] splits library text into top-level
//!    `(symbol ...)` blocks.
//! 2. [`kicad::symbol::extract_symbol`] parses each block and pulls out pins,
//!    the bounding box ([`kicad::geometry`]) and the `extends` reference.
//! 3. [`kicad::index::SymbolIndexBuilder`] merges libraries into one
//!    [`kicad::index::SymbolIndex`], later libraries winning on collisions.
//! 4. [`kicad::index::SymbolIndex::resolve_inheritance`] fills empty pins and
//!    bounding boxes from base symbols in a single pass.

pub mod kicad;

use serde::Serialize;

pub use kicad::index::{IndexStats, SymbolIndex, SymbolIndexBuilder, build_index};
pub use kicad::inherit::ResolveStats;
pub use kicad::library::{KicadSymbolLibrary, LibrarySource, ScanStats};
pub use kicad::scanner::{Block, BlockScanner, ScanOptions};
pub use kicad::symbol::{SkipReason, extract_symbol};

/// A pin as seen by downstream consumers.
///
/// `y` is already flipped into the consumer's downward-positive convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    electrical_type: String,
    x: f64,
    y: f64,
    orientation: f64,
    name: String,
    number: String,
}

impl Pin {
    /// Build a pin from source coordinates; `source_y` is negated here.
    pub fn from_source(
        electrical_type: impl Into<String>,
        (x, source_y): (f64, f64),
        orientation: Option<f64>,
        name: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            electrical_type: electrical_type.into(),
            x,
            y: -source_y,
            orientation: orientation.unwrap_or(0.0),
            name: name.into(),
            number: number.into(),
        }
    }

    pub fn electrical_type(&self) -> &str {
        &self.electrical_type
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> &str {
        &self.number
    }
}

/// Axis-aligned envelope of a symbol's body graphics.
///
/// Only constructible from corners or points, so `min_* <= max_*` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl BoundingBox {
    /// Envelope of two opposite corners given in any order.
    pub fn from_corners((x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> Self {
        Self {
            min_x: x1.min(x2),
            max_x: x1.max(x2),
            min_y: y1.min(y2),
            max_y: y1.max(y2),
        }
    }

    /// Envelope of a point cloud, `None` when there are no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = Self::from_corners(first, first);
        for point in points {
            bbox.include(point);
        }
        Some(bbox)
    }

    fn include(&mut self, (x, y): (f64, f64)) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }
}

/// One top-level symbol extracted from a library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolEntry {
    pub(crate) id: String,
    pub(crate) pins: Vec<Pin>,
    pub(crate) bbox: Option<BoundingBox>,
    pub(crate) extends: Option<String>,
    pub(crate) kicad_sym_raw: String,
    /// Set once the inheritance pass has looked at this entry.
    #[serde(skip)]
    pub(crate) resolved: bool,
}

impl SymbolEntry {
    pub fn new(
        id: impl Into<String>,
        pins: Vec<Pin>,
        bbox: Option<BoundingBox>,
        extends: Option<String>,
        kicad_sym_raw: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            pins,
            bbox,
            extends,
            kicad_sym_raw: kicad_sym_raw.into(),
            resolved: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    /// Verbatim source text of the block this entry came from.
    pub fn kicad_sym_raw(&self) -> &str {
        &self.kicad_sym_raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_y_is_negated() {
        let pin = Pin::from_source("passive", (1.5, 3.81), None, "~", "1");
        assert_eq!(pin.x(), 1.5);
        assert_eq!(pin.y(), -3.81);
        assert_eq!(pin.orientation(), 0.0);

        let pin = Pin::from_source("input", (0.0, -2.54), Some(90.0), "A", "2");
        assert_eq!(pin.y(), 2.54);
        assert_eq!(pin.orientation(), 90.0);
    }

    #[test]
    fn bbox_from_corners_is_order_independent() {
        let expected = BoundingBox::from_corners((-1.0, -2.0), (3.0, 4.0));
        for (a, b) in [
            ((3.0, 4.0), (-1.0, -2.0)),
            ((-1.0, 4.0), (3.0, -2.0)),
            ((3.0, -2.0), (-1.0, 4.0)),
        ] {
            assert_eq!(BoundingBox::from_corners(a, b), expected);
        }
        assert_eq!(expected.min_x(), -1.0);
        assert_eq!(expected.max_x(), 3.0);
        assert_eq!(expected.min_y(), -2.0);
        assert_eq!(expected.max_y(), 4.0);
    }

    #[test]
    fn bbox_from_points() {
        assert_eq!(BoundingBox::from_points(std::iter::empty()), None);

        let bbox = BoundingBox::from_points([(0.0, 1.0), (-2.0, 5.0), (4.0, -3.0)]).unwrap();
        assert_eq!(bbox, BoundingBox::from_corners((-2.0, -3.0), (4.0, 5.0)));
    }

    #[test]
    fn entry_serializes_with_consumer_field_names() {
        let entry = SymbolEntry::new(
            "R",
            vec![Pin::from_source("passive", (0.0, 5.0), None, "1", "1")],
            Some(BoundingBox::from_corners((0.0, 0.0), (10.0, 10.0))),
            Some("R_base".to_string()),
            "(symbol \"R\")",
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "R",
                "pins": [{
                    "electrical_type": "passive",
                    "x": 0.0,
                    "y": -5.0,
                    "orientation": 0.0,
                    "name": "1",
                    "number": "1"
                }],
                "bbox": {"minX": 0.0, "maxX": 10.0, "minY": 0.0, "maxY": 10.0},
                "extends": "R_base",
                "kicad_sym_raw": "(symbol \"R\")"
            })
        );
    }

    #[test]
    fn missing_bbox_and_extends_serialize_as_null() {
        let entry = SymbolEntry::new("X", Vec::new(), None, None, "");
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["bbox"].is_null());
        assert!(json["extends"].is_null());
        assert_eq!(json["pins"], serde_json::json!([]));
    }
}
