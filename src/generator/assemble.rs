//! Plan assembly: turn a selected route plus customer notes into an exact
//! number of day plan fragments.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::generator::expand::expand_block;
use crate::library::Library;
use crate::types::{DayPlanFragment, RouteTemplate};

/// Keyword rule: when customer notes match, the named block must appear in
/// the plan. Patterns cover both Latin and Cyrillic spellings.
struct NoteRule {
    pattern: &'static Lazy<Regex>,
    block_id: &'static str,
}

macro_rules! note_regex {
    ($name:ident, $pat:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).unwrap());
    };
}

note_regex!(RE_KOLSAY, r"(?i)kolsa[iy]|колсай|kaindy|кайынд");
note_regex!(RE_SHYMBULAK, r"(?i)shymbul|шымбул");
note_regex!(RE_CHARYN, r"(?i)charyn|чарын");
note_regex!(RE_TAMGALY, r"(?i)tamgaly|тамғал|тамгал");
note_regex!(RE_SHOPPING, r"(?i)shopping|mega|шопп");

static NOTE_RULES: [NoteRule; 5] = [
    NoteRule { pattern: &RE_KOLSAY, block_id: "KOL_2D_KOLSAY_KAINDY" },
    NoteRule { pattern: &RE_SHYMBULAK, block_id: "ALM_MEDEU_SHYMBULAK" },
    NoteRule { pattern: &RE_CHARYN, block_id: "CHR_CHARYN_FULLDAY" },
    NoteRule { pattern: &RE_TAMGALY, block_id: "IL_TAMGALY_TAS" },
    NoteRule { pattern: &RE_SHOPPING, block_id: "ALM_SHOPPING_DAY" },
];

/// Blocks used to pad short plans, cycled in order.
const FALLBACK_BLOCKS: [&str; 5] = [
    "ALM_CITY_HIGHLIGHTS_STD",
    "ALM_MEDEU_SHYMBULAK",
    "ALM_SHYMBULAK_GORELNIK_ACTIVE",
    "ALM_SHOPPING_DAY",
    "CHR_CHARYN_BLACK_MOON",
];

/// Block ids the notes demand.
pub fn required_blocks_from_notes(notes: &str) -> Vec<&'static str> {
    if notes.trim().is_empty() {
        return Vec::new();
    }
    NOTE_RULES
        .iter()
        .filter(|rule| rule.pattern.is_match(notes))
        .map(|rule| rule.block_id)
        .collect()
}

fn expand_id(library: &Library, block_id: &str, city: &str) -> Vec<DayPlanFragment> {
    match library.blocks.get(block_id) {
        Some(block) => expand_block(block, city),
        None => {
            warn!(target: "itinera::assemble", block_id, "block missing from library");
            vec![DayPlanFragment {
                block_id: block_id.to_string(),
                title: format!("{} (NOT FOUND in library blocks)", block_id),
                overnight: city.to_string(),
                ..Default::default()
            }]
        }
    }
}

/// Assemble exactly `target_days` fragments from a route, honoring
/// note-required blocks and padding with the fallback rotation.
///
/// Required blocks that the route lacks replace the most recently added
/// non-required day so the plan length stays stable; when nothing is
/// replaceable they are appended and the tail is truncated at the end.
pub fn assemble_plan(
    library: &Library,
    route: &RouteTemplate,
    notes: &str,
    city: &str,
    target_days: u32,
) -> Vec<DayPlanFragment> {
    let target = target_days as usize;

    let mut fragments: Vec<DayPlanFragment> = Vec::new();
    for block_id in &route.block_ids {
        fragments.extend(expand_id(library, block_id, city));
    }

    let mut required_ids: Vec<&str> = Vec::new();
    for block_id in required_blocks_from_notes(notes) {
        required_ids.push(block_id);
        if fragments.iter().any(|f| f.block_id == block_id) {
            continue;
        }
        let expansion = expand_id(library, block_id, city);
        // replace the latest day that is neither note-required itself nor a
        // visible NOT FOUND marker
        let slot = fragments.iter().rposition(|f| {
            !required_ids.contains(&f.block_id.as_str()) && !f.title.contains("(NOT FOUND")
        });
        match slot {
            Some(idx) => {
                fragments.splice(idx..idx + 1, expansion);
            }
            None => fragments.extend(expansion),
        }
        debug!(target: "itinera::assemble", block_id, "inserted note-required block");
    }

    let mut fallback_cursor = 0usize;
    let mut guard = 0usize;
    while fragments.len() < target && guard < target + FALLBACK_BLOCKS.len() {
        let block_id = FALLBACK_BLOCKS[fallback_cursor % FALLBACK_BLOCKS.len()];
        fallback_cursor += 1;
        guard += 1;
        if fragments.iter().any(|f| f.block_id == block_id) {
            continue;
        }
        fragments.extend(expand_id(library, block_id, city));
    }
    // rotation exhausted: repeat it allowing duplicates rather than
    // returning a short plan
    while fragments.len() < target {
        let block_id = FALLBACK_BLOCKS[fallback_cursor % FALLBACK_BLOCKS.len()];
        fallback_cursor += 1;
        fragments.extend(expand_id(library, block_id, city));
    }

    fragments.truncate(target);
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentBlock;
    use std::collections::HashMap;

    fn library_with(ids: &[&str]) -> Library {
        let mut blocks = HashMap::new();
        for id in ids {
            blocks.insert(
                id.to_string(),
                ContentBlock {
                    block_id: id.to_string(),
                    title: format!("Title {}", id),
                    output_template: "A pleasant day out.".into(),
                    ..Default::default()
                },
            );
        }
        Library { routes: Vec::new(), blocks }
    }

    fn route_of(ids: &[&str]) -> RouteTemplate {
        RouteTemplate {
            route_id: "R".into(),
            day_count: ids.len() as u32,
            block_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn notes_map_to_required_blocks_in_both_scripts() {
        assert_eq!(
            required_blocks_from_notes("хотим на Колсай и чарын"),
            vec!["KOL_2D_KOLSAY_KAINDY", "CHR_CHARYN_FULLDAY"]
        );
        assert_eq!(
            required_blocks_from_notes("Shymbulak please"),
            vec!["ALM_MEDEU_SHYMBULAK"]
        );
        assert!(required_blocks_from_notes("").is_empty());
    }

    #[test]
    fn required_block_replaces_latest_optional_day() {
        let lib = library_with(&["A", "B", "CHR_CHARYN_FULLDAY"]);
        let plan = assemble_plan(&lib, &route_of(&["A", "B"]), "charyn canyon", "Almaty", 2);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].block_id, "A");
        assert_eq!(plan[1].block_id, "CHR_CHARYN_FULLDAY");
    }

    #[test]
    fn missing_blocks_become_placeholders() {
        let lib = library_with(&[]);
        let plan = assemble_plan(&lib, &route_of(&["GONE"]), "", "Almaty", 1);
        assert_eq!(plan[0].title, "GONE (NOT FOUND in library blocks)");
        assert_eq!(plan[0].overnight, "Almaty");
    }

    #[test]
    fn short_route_is_padded_to_target() {
        let lib = library_with(&["A", "ALM_CITY_HIGHLIGHTS_STD", "ALM_MEDEU_SHYMBULAK"]);
        let plan = assemble_plan(&lib, &route_of(&["A"]), "", "Almaty", 3);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[1].block_id, "ALM_CITY_HIGHLIGHTS_STD");
        assert_eq!(plan[2].block_id, "ALM_MEDEU_SHYMBULAK");
    }

    #[test]
    fn long_route_is_truncated() {
        let lib = library_with(&["A", "B", "C"]);
        let plan = assemble_plan(&lib, &route_of(&["A", "B", "C"]), "", "Almaty", 2);
        assert_eq!(plan.len(), 2);
    }
}
