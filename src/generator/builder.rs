//! Itinerary construction: derive metadata from the request and map day
//! plan fragments onto dated, labeled days.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::Result;
use crate::logic::{normalize_location_label, normalize_overnight_label, normalize_time_label};
use crate::types::request::{format_date_ddmmyyyy, month_name_en, season_from_month};
use crate::types::{DayPlanFragment, Itinerary, ItineraryDay, ItineraryMeta, ItineraryRequest};

/// "<pax>A" plus "+<kids>K" when children travel.
pub fn pax_tag(pax: u32, kids: u32) -> String {
    if kids > 0 {
        format!("{}A+{}K", pax, kids)
    } else {
        format!("{}A", pax)
    }
}

/// Derive itinerary metadata from a validated request.
pub fn build_meta(req: &ItineraryRequest, start: NaiveDate, days_count: u32) -> ItineraryMeta {
    let (season_title, season_key) = season_from_month(start.month());
    let season = req
        .season
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| season_title.to_string());
    let template_key = req
        .template_key
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| season_key.to_string());
    ItineraryMeta {
        city: req.city.trim().to_string(),
        start: format_date_ddmmyyyy(start),
        template_key,
        season,
        pax: req.pax,
        kids: req.kids,
        arrival_time: req.arrival_time.trim().to_string(),
        departure_time: req.departure_time.trim().to_string(),
        days_count,
        days_nights: format!("{}D{}N", days_count, days_count.saturating_sub(1)),
        pax_tag: pax_tag(req.pax, req.kids),
        tour_month: month_name_en(start.month()).to_string(),
    }
}

/// Turn fragments into a draft itinerary, one day per fragment. Labels are
/// put in canonical form here; realism rules run in the post-fix pass.
pub fn build_itinerary(
    req: &ItineraryRequest,
    start: NaiveDate,
    fragments: &[DayPlanFragment],
) -> Result<Itinerary> {
    let meta = build_meta(req, start, fragments.len() as u32);
    let days = fragments
        .iter()
        .enumerate()
        .map(|(i, frag)| ItineraryDay {
            number: format!("Day {}", i + 1),
            date: format_date_ddmmyyyy(start + Duration::days(i as i64)),
            name: frag.title.trim().to_string(),
            time: normalize_time_label(&frag.time),
            location: normalize_location_label(&frag.locations),
            overnight: normalize_overnight_label(&frag.overnight),
            description: frag.description.trim().to_string(),
        })
        .collect();
    Ok(Itinerary { meta, days })
}
