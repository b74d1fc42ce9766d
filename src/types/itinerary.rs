use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One concrete day inside an itinerary.
///
/// `time`, `location` and `overnight` carry their presentation labels
/// ("Time:", "Visited Locations:", "Overnight:") or are empty; the post-fix
/// engine normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ItineraryDay {
    /// "Day N", 1-indexed and contiguous
    pub number: String,
    /// Calendar date as DD.MM.YYYY
    pub date: String,
    /// Short day title
    pub name: String,
    /// Labeled time window or empty
    pub time: String,
    /// Labeled location list or empty
    pub location: String,
    /// Labeled overnight place; "Overnight: -" on the final day
    pub overnight: String,
    /// Free-text description, 20–35 words after post-fix
    pub description: String,
}

/// Derived metadata for an itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ItineraryMeta {
    pub city: String,
    /// Start date as DD.MM.YYYY
    pub start: String,
    /// Lowercase season key used to select presentation templates
    pub template_key: String,
    /// Season title (Winter/Spring/Summer/Autumn)
    pub season: String,
    pub pax: u32,
    pub kids: u32,
    /// "HH:MM" or "-" when unknown
    pub arrival_time: String,
    /// "HH:MM" or "-" when unknown
    pub departure_time: String,
    pub days_count: u32,
    /// "<N>D<N-1>N"
    pub days_nights: String,
    /// "<pax>A[+<kids>K]"
    pub pax_tag: String,
    /// English month name of the start date
    pub tour_month: String,
}

/// The canonical itinerary interchange struct: meta plus ordered days.
///
/// This is the sole contract between generation, post-fix, validation,
/// editing and rendering. Edits replace it wholesale, never merge into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Itinerary {
    pub meta: ItineraryMeta,
    pub days: Vec<ItineraryDay>,
}

impl Itinerary {
    /// Render the struct as the plain-text preview used in chat replies.
    pub fn to_preview_text(&self) -> String {
        let mut out = Vec::new();
        for (i, d) in self.days.iter().enumerate() {
            let number = if d.number.is_empty() {
                format!("Day {}", i + 1)
            } else {
                d.number.clone()
            };
            out.push(format!("{} – {}: {}", number, d.date, d.name));
            if !d.time.is_empty() {
                out.push(d.time.clone());
            }
            if !d.location.is_empty() {
                out.push(d.location.clone());
            }
            if !d.overnight.is_empty() {
                out.push(d.overnight.clone());
            }
            if !d.description.is_empty() {
                out.push(d.description.clone());
            }
            out.push(String::new());
        }
        out.join("\n").trim().to_string()
    }
}
