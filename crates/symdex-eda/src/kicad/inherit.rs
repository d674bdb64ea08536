use serde::Serialize;
use std::collections::BTreeMap;

use crate::{BoundingBox, Pin, SymbolEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    /// Entries whose empty pin list was filled from their base.
    pub inherited_pins: usize,
    /// Entries whose unset bbox was filled from their base.
    pub inherited_bbox: usize,
    /// Entries naming a base that is not in the index.
    pub missing_base: usize,
}

/// Fields one entry takes from its base, computed against the pre-pass state.
struct Inheritance {
    id: String,
    pins: Option<Vec<Pin>>,
    bbox: Option<BoundingBox>,
}

/// Single inheritance pass over `entries`.
///
/// Every base is read as it was before the pass, so a chain `C -> B -> A`
/// only moves fields one hop. Entries that have already been through a pass
/// are left alone, which makes repeated calls no-ops.
pub fn resolve_inheritance(entries: &mut BTreeMap<String, SymbolEntry>) -> ResolveStats {
    let mut stats = ResolveStats::default();

    let plan: Vec<Inheritance> = entries
        .values()
        .filter(|entry| !entry.resolved)
        .filter_map(|entry| {
            let base_id = entry.extends.as_deref()?;
            let Some(base) = entries.get(base_id) else {
                log::debug!("Symbol '{}' extends '{base_id}' but base not found", entry.id);
                stats.missing_base += 1;
                return Some(Inheritance {
                    id: entry.id.clone(),
                    pins: None,
                    bbox: None,
                });
            };

            let pins = (entry.pins.is_empty() && !base.pins.is_empty()).then(|| base.pins.clone());
            let bbox = if entry.bbox.is_none() { base.bbox } else { None };
            Some(Inheritance {
                id: entry.id.clone(),
                pins,
                bbox,
            })
        })
        .collect();

    for step in plan {
        let Some(entry) = entries.get_mut(&step.id) else {
            continue;
        };
        if let Some(pins) = step.pins {
            entry.pins = pins;
            stats.inherited_pins += 1;
        }
        if let Some(bbox) = step.bbox {
            entry.bbox = Some(bbox);
            stats.inherited_bbox += 1;
        }
        entry.resolved = true;
    }

    stats
}
