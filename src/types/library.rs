use serde::{Deserialize, Serialize};

/// A route template: an ordered block-id sequence tagged with
/// destination/season/day-count. Immutable library data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTemplate {
    pub route_id: String,
    pub city: String,
    /// winter/spring/summer/autumn/all (free-form in the library; normalized
    /// at selection time)
    pub season: String,
    pub day_count: u32,
    pub lang: String,
    pub tags: String,
    /// Block ids in day order
    pub block_ids: Vec<String>,
}

impl RouteTemplate {
    /// The synthetic route returned when the library has no candidates.
    /// Callers treat it as "no content available" and rely on fallbacks.
    pub fn auto() -> Self {
        Self {
            route_id: "AUTO".into(),
            ..Default::default()
        }
    }
}

/// A reusable content block describing one conceptual day or a multi-day
/// excursion. The output template may encode several days via "DAY n:"
/// markers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    pub block_id: String,
    pub title: String,
    pub suggested_time: String,
    pub what_it_covers: String,
    pub output_template: String,
    pub season: String,
    pub city: String,
    pub tags: String,
    /// Program override applied from the program table; replaces the output
    /// template when present.
    pub program: Option<String>,
}

impl ContentBlock {
    /// The template text the expander should parse.
    pub fn template_text(&self) -> &str {
        self.program.as_deref().unwrap_or(&self.output_template)
    }
}

/// One concrete day plan produced by expanding a content block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayPlanFragment {
    pub block_id: String,
    pub title: String,
    pub time: String,
    pub locations: String,
    pub overnight: String,
    pub description: String,
}
