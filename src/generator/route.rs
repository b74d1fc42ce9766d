//! Route selection: pick the best-fitting route template for a season and
//! day count, degrading gracefully when the library is thin.

use tracing::debug;

use crate::types::RouteTemplate;

/// Collapse a free-form season value to a canonical key. Anything
/// unrecognized means "fits all seasons".
pub fn normalize_season(raw: &str) -> &'static str {
    let s = raw.trim().to_ascii_lowercase();
    if s.starts_with("wint") {
        "winter"
    } else if s.starts_with("spr") {
        "spring"
    } else if s.starts_with("sum") {
        "summer"
    } else if s.starts_with("aut") || s.starts_with("fall") {
        "autumn"
    } else {
        "all"
    }
}

fn season_fits(route_season: &str, wanted: &str) -> bool {
    let rs = normalize_season(route_season);
    rs == "all" || wanted == "all" || rs == wanted
}

/// Pick a route for the requested season and day count.
///
/// Tiered fallback: exact day match, then the largest shorter route, then
/// the smallest longer one, then whatever is first. Season filtering is
/// relaxed entirely if it empties the pool. An empty library yields the
/// synthetic AUTO route so downstream padding still produces output.
pub fn select_route(routes: &[RouteTemplate], season: &str, days: u32) -> RouteTemplate {
    let wanted = normalize_season(season);

    let mut pool: Vec<&RouteTemplate> = routes
        .iter()
        .filter(|r| r.day_count > 0 && season_fits(&r.season, wanted))
        .collect();
    if pool.is_empty() {
        pool = routes.iter().filter(|r| r.day_count > 0).collect();
    }
    if pool.is_empty() {
        debug!(target: "itinera::route", season = wanted, days, "no routes available, using AUTO");
        return RouteTemplate::auto();
    }

    if let Some(exact) = pool.iter().find(|r| r.day_count == days) {
        return (*exact).clone();
    }
    if let Some(shorter) = pool
        .iter()
        .filter(|r| r.day_count < days)
        .max_by_key(|r| r.day_count)
    {
        return (*shorter).clone();
    }
    if let Some(longer) = pool
        .iter()
        .filter(|r| r.day_count > days)
        .min_by_key(|r| r.day_count)
    {
        return (*longer).clone();
    }
    pool[0].clone()
}
