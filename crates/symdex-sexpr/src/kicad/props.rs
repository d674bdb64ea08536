//! Common KiCad-ish S-expression query helpers.
//!
//! KiCad formats use small list nodes that behave like key/value properties:
//! `(tag "value")`, `(tag 1.27)`, `(tag x y)`. These helpers standardize querying.

use crate::{Sexpr, find_child_list, number_as_f64};

/// Find a direct child list `(tag ...)` within `list`.
pub fn child_list<'a>(list: &'a [Sexpr], tag: &str) -> Option<&'a [Sexpr]> {
    find_child_list(list, tag)
}

/// Find a string property `(tag "VALUE")` within `list`.
pub fn string_prop(list: &[Sexpr], tag: &str) -> Option<String> {
    child_list(list, tag)?
        .get(1)?
        .as_str()
        .map(|s| s.to_string())
}

/// Find a coordinate property `(tag X Y ...)` within `list`.
///
/// Both coordinates must be numeric; trailing values are ignored.
pub fn point_prop(list: &[Sexpr], tag: &str) -> Option<(f64, f64)> {
    let items = child_list(list, tag)?;
    Some((number_as_f64(items.get(1)?)?, number_as_f64(items.get(2)?)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn queries_direct_children_only() {
        let parsed =
            parse(r#"(rectangle (start -2.54 5.08) (end 2 -5) (stroke (width 0.254)) (fill (type background)))"#)
                .unwrap();
        let items = parsed.as_list().unwrap();

        assert_eq!(point_prop(items, "start"), Some((-2.54, 5.08)));
        assert_eq!(point_prop(items, "end"), Some((2.0, -5.0)));
        assert_eq!(point_prop(items, "stroke"), None);
        assert_eq!(
            string_prop(child_list(items, "fill").unwrap(), "type"),
            None,
            "symbol atoms are not strings"
        );
        assert!(child_list(items, "width").is_none());
    }

    #[test]
    fn point_requires_two_numbers() {
        let parsed = parse(r#"(pin (at 1) (name "A"))"#).unwrap();
        let items = parsed.as_list().unwrap();
        assert_eq!(point_prop(items, "at"), None);
        assert_eq!(string_prop(items, "name").as_deref(), Some("A"));
    }
}
