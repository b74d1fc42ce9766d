//! Itinerary validation gate. Everything coming back from the model (and
//! anything loaded from storage) passes through here before it is trusted.

use serde_json::Value;
use tracing::debug;

use crate::logic::words::{word_count, MIN_WORDS};
use crate::types::Itinerary;

/// Parse and check an itinerary candidate.
///
/// Lenient mode accepts any object with a `meta` object and a non-empty
/// `days` array, letting serde defaults fill gaps and repairing missing day
/// numbers. Strict mode additionally requires canonical field labels and
/// descriptions of at least the minimum word count, which is what generated
/// and post-fixed output always satisfies.
pub fn validate_itinerary(value: &Value, strict: bool) -> Option<Itinerary> {
    let obj = value.as_object()?;
    if !obj.get("meta").map(Value::is_object).unwrap_or(false) {
        debug!(target: "itinera::validator", "rejected: meta is missing or not an object");
        return None;
    }
    match obj.get("days") {
        Some(Value::Array(days)) if !days.is_empty() => {}
        _ => {
            debug!(target: "itinera::validator", "rejected: days missing or empty");
            return None;
        }
    }

    let mut itinerary: Itinerary = match serde_path_to_error::deserialize(value.clone()) {
        Ok(it) => it,
        Err(err) => {
            debug!(
                target: "itinera::validator",
                path = %err.path(),
                error = %err,
                "rejected: shape mismatch"
            );
            return None;
        }
    };

    for (i, day) in itinerary.days.iter_mut().enumerate() {
        if day.number.trim().is_empty() {
            day.number = format!("Day {}", i + 1);
        }
    }

    if strict {
        for day in &itinerary.days {
            if !label_ok(&day.time, "Time: ")
                || !label_ok(&day.location, "Visited Locations: ")
                || !label_ok(&day.overnight, "Overnight: ")
            {
                debug!(target: "itinera::validator", day = %day.number, "rejected: label out of form");
                return None;
            }
            if word_count(&day.description) < MIN_WORDS {
                debug!(target: "itinera::validator", day = %day.number, "rejected: description too short");
                return None;
            }
        }
    }

    Some(itinerary)
}

fn label_ok(field: &str, label: &str) -> bool {
    field.is_empty() || field.starts_with(label)
}
