use symdex_sexpr::kicad::point_prop;
use symdex_sexpr::{Sexpr, find_all_child_lists};

use crate::BoundingBox;

/// Bounding box of a symbol's body.
///
/// The first well-formed `(rectangle (start ..) (end ..))` anywhere in the tree
/// wins. Without one, every `(xy ..)` point of every `(polyline (pts ..))` is
/// enveloped. Other primitives (arcs, circles, text) are not considered.
pub fn resolve_bbox(symbol: &Sexpr) -> Option<BoundingBox> {
    rectangle_bbox(symbol).or_else(|| polyline_bbox(symbol))
}

fn rectangle_bbox(symbol: &Sexpr) -> Option<BoundingBox> {
    symbol.lists_tagged("rectangle").into_iter().find_map(|rect| {
        let start = point_prop(rect, "start")?;
        let end = point_prop(rect, "end")?;
        Some(BoundingBox::from_corners(start, end))
    })
}

fn polyline_bbox(symbol: &Sexpr) -> Option<BoundingBox> {
    let points = symbol
        .lists_tagged("polyline")
        .into_iter()
        .filter_map(|polyline| symdex_sexpr::find_child_list(polyline, "pts"))
        .flat_map(|pts| find_all_child_lists(pts, "xy"))
        .filter_map(xy_point);
    BoundingBox::from_points(points)
}

fn xy_point(xy: &[Sexpr]) -> Option<(f64, f64)> {
    let x = symdex_sexpr::number_as_f64(xy.get(1)?)?;
    let y = symdex_sexpr::number_as_f64(xy.get(2)?)?;
    Some((x, y))
}
