//! KiCad-specific S-expression helpers.
//!
//! - [`props`] - property-like query helpers (`(tag "value")`, `(at x y r)`)
//! - [`symbol`] - KiCad symbol library (`.kicad_sym`) helpers

pub mod props;
pub mod symbol;

pub use props::{child_list, point_prop, string_prop};
pub use symbol::{symbol_extends, symbol_name};
