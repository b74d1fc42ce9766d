//! Document export: flatten an itinerary into renderer placeholders and
//! define the seam actual renderers implement.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{EngineError, Result};
use crate::types::Itinerary;

/// Number of day slots a document template carries. Itineraries longer
/// than this cannot be rendered.
pub const TEMPLATE_DAY_SLOTS: u32 = 12;

const DAY_FIELDS: [&str; 7] = [
    "NUMBER",
    "DATE",
    "NAME",
    "TIME",
    "DESCRIPTION",
    "LOCATION",
    "OVERNIGHT",
];

/// Flatten an itinerary into the `DAY_NN_FIELD` placeholder map plus the
/// meta placeholders. Unused day slots are present but blank so templates
/// render cleanly.
pub fn build_placeholders(it: &Itinerary) -> Result<BTreeMap<String, String>> {
    if it.days.len() as u32 > TEMPLATE_DAY_SLOTS {
        return Err(EngineError::Render(format!(
            "itinerary has {} days but the template carries {} day slots",
            it.days.len(),
            TEMPLATE_DAY_SLOTS
        )));
    }

    let mut map = BTreeMap::new();
    for slot in 1..=TEMPLATE_DAY_SLOTS {
        let day = it.days.get(slot as usize - 1);
        let values: [&str; 7] = match day {
            Some(d) => [
                &d.number,
                &d.date,
                &d.name,
                &d.time,
                &d.description,
                &d.location,
                &d.overnight,
            ],
            None => [""; 7],
        };
        for (field, value) in DAY_FIELDS.iter().zip(values) {
            map.insert(format!("DAY_{:02}_{}", slot, field), value.to_string());
        }
    }

    map.insert("DAYS_NIGHTS".into(), it.meta.days_nights.clone());
    map.insert("PAX_TAG".into(), it.meta.pax_tag.clone());
    map.insert("TOUR_MONTH".into(), it.meta.tour_month.clone());
    map.insert("ARRIVAL_TIME".into(), it.meta.arrival_time.clone());
    map.insert("DEPARTURE_TIME".into(), it.meta.departure_time.clone());
    Ok(map)
}

/// Human-readable document name derived from the itinerary metadata.
pub fn document_name(it: &Itinerary) -> String {
    format!(
        "{} _ {} _ {} _ {} _ {}",
        it.meta.days_nights, it.meta.pax_tag, it.meta.tour_month, it.meta.city, it.meta.season
    )
}

/// A backend that turns placeholders into a finished document and returns
/// a link to it.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(
        &self,
        name: &str,
        template_key: &str,
        placeholders: &BTreeMap<String, String>,
    ) -> Result<String>;
}
