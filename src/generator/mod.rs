//! Deterministic itinerary generation: route selection, block expansion,
//! plan assembly and itinerary construction.

pub mod assemble;
pub mod builder;
pub mod expand;
pub mod route;

use tracing::info;

use crate::error::Result;
use crate::library::Library;
use crate::logic::PostFix;
use crate::services::completion::TextCompletion;
use crate::types::request::season_from_month;
use crate::types::{Itinerary, ItineraryRequest};
use chrono::Datelike;

/// Run the full generation pipeline for one request. Deterministic: the
/// same library and request always produce the same itinerary.
pub fn generate(library: &Library, req: &ItineraryRequest, postfix: &PostFix) -> Result<Itinerary> {
    let mut itinerary = build(library, req)?;
    postfix.apply(&mut itinerary);
    Ok(itinerary)
}

/// Same pipeline, but descriptions outside the word window are first offered
/// to the completion service for a natural rewrite before the deterministic
/// pass backstops them.
pub async fn generate_with(
    library: &Library,
    req: &ItineraryRequest,
    postfix: &PostFix,
    svc: &dyn TextCompletion,
) -> Result<Itinerary> {
    let mut itinerary = build(library, req)?;
    postfix.apply_with(&mut itinerary, svc).await;
    Ok(itinerary)
}

fn build(library: &Library, req: &ItineraryRequest) -> Result<Itinerary> {
    let start = req.validate()?;
    let days = req.days;

    let season = req
        .season
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| season_from_month(start.month()).0.to_string());

    let route = route::select_route(&library.routes, &season, days);
    info!(
        target: "itinera::generate",
        city = %req.city,
        days,
        season = %season,
        route = %route.route_id,
        "generating itinerary"
    );

    let fragments = assemble::assemble_plan(library, &route, &req.notes, req.city.trim(), days);
    builder::build_itinerary(req, start, &fragments)
}
