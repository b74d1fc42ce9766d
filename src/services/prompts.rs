//! Prompt construction for the LLM-assisted edit cycle.

use once_cell::sync::Lazy;
use schemars::schema_for;
use serde_json::Value;

use crate::error::Result;
use crate::types::Itinerary;

/// JSON Schema of the itinerary interchange struct, derived from the types
/// themselves so the prompt can never drift from the code.
pub static ITINERARY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::to_value(schema_for!(Itinerary)).unwrap_or(Value::Null)
});

const TRAVEL_LOGIC_RULES: &str = "\
TRAVEL LOGIC (always enforced after your edit, so respect it up front):
- Arrivals at 21:00 or later are transfer-and-rest only; 18:00-20:59 allow a calm dinner.
- The departure day ends at the airport and has no overnight (\"Overnight: -\").
- Long out-of-town trips (Charyn, Kolsai, Kaindy, Altyn Emel) return late; no evening plans on those days.
- The Kolsai/Kaindy excursion runs Kolsai first with an overnight in Saty, Kaindy and return second.
- Every non-final day names an overnight place.";

const HARD_RULES: &str = "\
HARD RULES:
- Return ONLY one JSON object, no prose, no markdown fences.
- Keep the exact JSON shape of CURRENT_JSON (same keys in meta and in every day).
- Keep days contiguous and numbered \"Day 1\", \"Day 2\", ...
- Keep field labels: time starts with \"Time: \", location with \"Visited Locations: \", overnight with \"Overnight: \".
- Keep every description between 20 and 35 words.
- Apply only the changes USER_EDITS asks for; keep everything else verbatim.";

/// Canned instructions for a final language pass over an itinerary that is
/// already structurally correct.
pub const POLISH_INSTRUCTIONS: &str = "Polish the language of every day name and description: natural, concise \
     English, no repeated sentence openers across days. Do not add, remove or \
     reorder days, and do not change dates, times, locations or overnights.";

/// Ask for a description rewrite that lands inside the word window.
pub fn rewrite_description_prompt(min_words: usize, max_words: usize, description: &str) -> String {
    format!(
        "Rewrite this travel itinerary day description in {}-{} words. Keep the \
         places and activities, neutral tone, English. Return only the rewritten \
         text.\n\n{}",
        min_words, max_words, description
    )
}

/// Build the full edit prompt: rules, schema, current state, requested
/// edits.
pub fn edit_prompt(current: &Itinerary, user_edits: &str) -> Result<String> {
    let current_json = serde_json::to_string_pretty(current)?;
    Ok(format!(
        "You edit travel itineraries. Apply the requested edits to the itinerary JSON.\n\n\
         {hard}\n\n{logic}\n\nSCHEMA:\n{schema}\n\nCURRENT_JSON:\n{current}\n\nUSER_EDITS:\n{edits}",
        hard = HARD_RULES,
        logic = TRAVEL_LOGIC_RULES,
        schema = *ITINERARY_SCHEMA,
        current = current_json,
        edits = user_edits.trim(),
    ))
}
