//! Travel-logic properties over whole itineraries: idempotence, realism at
//! the endpoints and compatibility with the strict validation gate.

use itinera::logic::PostFix;
use itinera::types::{Itinerary, ItineraryDay, ItineraryMeta};
use itinera::validate_itinerary;

fn meta(arrival: &str, departure: &str) -> ItineraryMeta {
    ItineraryMeta {
        city: "Almaty".into(),
        start: "01.05.2026".into(),
        arrival_time: arrival.into(),
        departure_time: departure.into(),
        ..Default::default()
    }
}

fn day(name: &str, location: &str, overnight: &str, description: &str) -> ItineraryDay {
    ItineraryDay {
        name: name.into(),
        location: location.into(),
        overnight: overnight.into(),
        description: description.into(),
        ..Default::default()
    }
}

fn messy(arrival: &str, departure: &str) -> Itinerary {
    Itinerary {
        meta: meta(arrival, departure),
        days: vec![
            day("", "", "", ""),
            day(
                "Kaindy Lake",
                "location: Kaindy Lake",
                "overnight: Saty",
                "Sunken forest.",
            ),
            day("Kolsai Lakes", "Kolsai", "", "Alpine lakes."),
            day(
                "Charyn Canyon",
                "Charyn Canyon",
                "-",
                "Canyon walk, then shopping at the mall in the evening.",
            ),
            day("City Walk", "Visited Locations: Center", "Almaty", "Stroll the center."),
            day("City Walk", "visited locations: Center", "", "Stroll the center."),
            day("", "", "", ""),
        ],
    }
}

#[test]
fn double_application_is_byte_identical() {
    let fix = PostFix::default();
    let scenarios = [
        ("21:40", "10:10"),
        ("19:30", "18:00"),
        ("10:10", "-"),
        ("-", "23:50"),
        ("16:30", "16:30"),
    ];
    for (arrival, departure) in scenarios {
        let mut it = messy(arrival, departure);
        fix.apply(&mut it);
        let first = serde_json::to_string(&it).unwrap();
        fix.apply(&mut it);
        let second = serde_json::to_string(&it).unwrap();
        assert_eq!(first, second, "arrival {} departure {}", arrival, departure);
    }
}

#[test]
fn fixed_output_passes_strict_validation() {
    let fix = PostFix::default();
    let mut it = messy("19:30", "10:10");

    let raw = serde_json::to_value(&it).unwrap();
    assert!(validate_itinerary(&raw, false).is_some());
    assert!(validate_itinerary(&raw, true).is_none(), "strict needs the fix pass first");

    fix.apply(&mut it);
    let fixed = serde_json::to_value(&it).unwrap();
    assert!(validate_itinerary(&fixed, true).is_some());
}

#[test]
fn reversed_lakes_end_up_in_travel_order() {
    let fix = PostFix::default();
    let mut it = messy("12:00", "18:00");
    fix.apply(&mut it);
    let kolsai = it
        .days
        .iter()
        .position(|d| d.location.contains("Kolsai"))
        .expect("kolsai day");
    let kaindy = it
        .days
        .iter()
        .position(|d| d.location.contains("Kaindy"))
        .expect("kaindy day");
    assert_eq!(kaindy, kolsai + 1);
    assert_eq!(it.days[kolsai].overnight, "Overnight: Saty");
    assert_eq!(it.days[kaindy].overnight, "Overnight: Almaty");
}

#[test]
fn evening_plans_do_not_survive_a_long_trip_day() {
    let fix = PostFix::default();
    let mut it = messy("12:00", "18:00");
    fix.apply(&mut it);
    let charyn = it
        .days
        .iter()
        .find(|d| d.name.contains("Charyn"))
        .expect("charyn day");
    let desc = charyn.description.to_lowercase();
    assert!(!desc.contains("shopping"));
    assert!(!desc.contains("mall"));
}

#[test]
fn duplicate_adjacent_days_are_diversified() {
    let fix = PostFix::default();
    let mut it = messy("12:00", "18:00");
    fix.apply(&mut it);
    let pairs = it.days.windows(2).filter(|w| {
        w[0].name.eq_ignore_ascii_case(&w[1].name)
            && w[0].location.eq_ignore_ascii_case(&w[1].location)
            && !w[0].name.is_empty()
    });
    assert_eq!(pairs.count(), 0);
}

#[test]
fn empty_itinerary_is_left_alone() {
    let fix = PostFix::default();
    let mut it = Itinerary {
        meta: meta("12:00", "18:00"),
        days: Vec::new(),
    };
    fix.apply(&mut it);
    assert!(it.days.is_empty());
}

#[test]
fn single_day_trip_gets_arrival_then_departure_treatment() {
    let fix = PostFix::default();
    let mut it = Itinerary {
        meta: meta("21:40", "10:10"),
        days: vec![day("", "", "", "")],
    };
    fix.apply(&mut it);
    let only = &it.days[0];
    // departure runs after arrival, so the single day ends as a departure
    assert_eq!(only.name, "Departure");
    assert_eq!(only.overnight, "Overnight: -");
    assert_eq!(only.time, "Time: 07:10 – 10:10");
}
