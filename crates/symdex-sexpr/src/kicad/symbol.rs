//! KiCad symbol library (`.kicad_sym`) helpers.

use crate::{Sexpr, list_tag};

/// Return the identifier from a `(symbol "<name>" ...)` list.
///
/// Only a non-empty quoted string directly after the head counts; unquoted or
/// empty names yield `None`.
pub fn symbol_name(symbol: &[Sexpr]) -> Option<&str> {
    if list_tag(symbol) != Some("symbol") {
        return None;
    }
    symbol
        .get(1)
        .and_then(Sexpr::as_str)
        .filter(|name| !name.is_empty())
}

/// Return the base symbol named by a direct `(extends "<name>")` child.
pub fn symbol_extends(symbol: &[Sexpr]) -> Option<&str> {
    symbol.iter().skip(2).find_map(|child| {
        let items = child.as_list()?;
        if list_tag(items) != Some("extends") {
            return None;
        }
        items.get(1)?.as_atom()
    })
}
