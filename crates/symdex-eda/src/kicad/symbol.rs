use symdex_sexpr::kicad::{point_prop, string_prop, symbol_extends, symbol_name};
use symdex_sexpr::{Parser, Sexpr, number_as_f64};
use thiserror::Error;

use super::geometry::resolve_bbox;
use super::scanner::Block;
use crate::{Pin, SymbolEntry};

/// Why a scanned block did not become an index entry.
///
/// None of these abort a run; callers tally them and move on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("symbol block at offset {offset} has no quoted identifier")]
    MissingIdentifier { offset: usize },

    #[error("symbol block at offset {offset} is never closed")]
    Unterminated { offset: usize },
}

/// Turn one scanned block into a [`SymbolEntry`].
///
/// The raw text is retained verbatim. When the quote-unaware scanner cut the
/// block short at a `)` inside a string, whatever string and lists are still
/// open at the block end are closed, and fields are taken from that partial
/// tree as long as the identifier itself is intact.
pub fn extract_symbol(block: &Block<'_>) -> Result<SymbolEntry, SkipReason> {
    let offset = block.span.start;
    let mut parser = Parser::new(block.text).lenient();
    let tree = parser
        .parse()
        .map_err(|_| SkipReason::MissingIdentifier { offset })?;

    let items = tree.as_list().unwrap_or_default();
    let repair = parser.repair();
    let id_cut = repair.open_string.is_some()
        && repair.open_string == items.get(1).map(|node| node.span.start);
    let id = symbol_name(items)
        .filter(|_| !id_cut)
        .ok_or(SkipReason::MissingIdentifier { offset })?;

    if !repair.is_clean() {
        log::warn!(
            "Symbol '{id}' at offset {offset} ends inside a string or list; \
             a quoted parenthesis probably shifted the block boundary"
        );
    } else if !block.text[parser.position()..].trim().is_empty() {
        log::warn!(
            "Symbol '{id}' at offset {offset} continues past its parsed end; \
             a quoted parenthesis probably shifted the block boundary"
        );
    }

    Ok(extract_fields(id, &tree, block.text))
}

/// Extract pins, bounding box and base reference from a parsed symbol tree.
pub fn extract_fields(id: &str, symbol: &Sexpr, raw: &str) -> SymbolEntry {
    let items = symbol.as_list().unwrap_or_default();
    let pins = symbol
        .lists_tagged("pin")
        .into_iter()
        .filter_map(parse_pin)
        .collect();

    SymbolEntry::new(
        id,
        pins,
        resolve_bbox(symbol),
        symbol_extends(items).map(ToOwned::to_owned),
        raw,
    )
}

/// Parse `(pin <electrical_type> [<graphical_style>] (at X Y [R]) ... (name "N") (number "1"))`.
///
/// Children may appear in any order with unrelated lists (`length`, `effects`,
/// `hide`) in between. Pins without a position or a number are not pins we can
/// place, so they are dropped.
fn parse_pin(pin: &[Sexpr]) -> Option<Pin> {
    let electrical_type = pin.get(1)?.as_atom()?;
    let at = point_prop(pin, "at")?;
    let rotation = symdex_sexpr::find_child_list(pin, "at")
        .and_then(|at| at.get(3))
        .and_then(number_as_f64);
    // KiCad allows unnamed pins (name ""); keep them and let consumers fall back to number.
    let name = string_prop(pin, "name")?;
    let number = string_prop(pin, "number").filter(|n| !n.is_empty())?;

    Some(Pin::from_source(electrical_type, at, rotation, name, number))
}
