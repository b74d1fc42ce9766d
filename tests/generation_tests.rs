//! End-to-end generation scenarios against an in-memory library.

use itinera::logic::words::{word_count, MAX_WORDS, MIN_WORDS};
use itinera::{build_placeholders, Engine, ItineraryRequest, Library};
use serde_json::json;

fn library() -> Library {
    Library::from_json(&json!({
        "routes": [
            {
                "ROUTE_ID": "ALM_W5",
                "CITY": "Almaty",
                "SEASON": "winter",
                "DAYS_COUNT": 5,
                "DAY_1_BLOCK_ID": "ALM_ARRIVAL",
                "DAY_2_BLOCK_ID": "ALM_CITY_HIGHLIGHTS_STD",
                "DAY_3_BLOCK_ID": "ALM_MEDEU_SHYMBULAK",
                "DAY_4_BLOCK_ID": "CHR_CHARYN_FULLDAY",
                "DAY_5_BLOCK_ID": "ALM_DEPARTURE"
            },
            {
                "ROUTE_ID": "ALM_S6",
                "CITY": "Almaty",
                "SEASON": "summer",
                "DAYS_COUNT": 6,
                "DAY_1_BLOCK_ID": "ALM_ARRIVAL",
                "DAY_2_BLOCK_ID": "ALM_CITY_HIGHLIGHTS_STD",
                "DAY_3_BLOCK_ID": "KOL_2D_KOLSAY_KAINDY",
                "DAY_4_BLOCK_ID": "CHR_CHARYN_FULLDAY",
                "DAY_5_BLOCK_ID": "ALM_DEPARTURE"
            },
            {
                "ROUTE_ID": "ALM_S10",
                "CITY": "Almaty",
                "SEASON": "summer",
                "DAYS_COUNT": 10,
                "DAY_1_BLOCK_ID": "ALM_ARRIVAL",
                "DAY_2_BLOCK_ID": "ALM_CITY_HIGHLIGHTS_STD"
            }
        ],
        "blocks": [
            {
                "BLOCK_ID": "ALM_ARRIVAL",
                "TITLE": "Arrival",
                "OUTPUT_TEMPLATE": "DAY_LOCATION: Airport, Hotel\nMeet your driver and transfer to the hotel for check-in and rest."
            },
            {
                "BLOCK_ID": "ALM_CITY_HIGHLIGHTS_STD",
                "TITLE": "City Highlights",
                "SUGGESTED_TIME": "10:00 – 17:00",
                "OUTPUT_TEMPLATE": "DAY_LOCATION: City Center, Panfilov Park, Green Bazaar\nClassic city sights at a relaxed pace with coffee stops and local food."
            },
            {
                "BLOCK_ID": "ALM_MEDEU_SHYMBULAK",
                "TITLE": "Medeu & Shymbulak",
                "SUGGESTED_TIME": "09:00 – 17:00",
                "OUTPUT_TEMPLATE": "DAY_LOCATION: Medeu, Shymbulak\nCable car ride up the gorge with mountain views and an easy walk."
            },
            {
                "BLOCK_ID": "CHR_CHARYN_FULLDAY",
                "TITLE": "Charyn Canyon",
                "OUTPUT_TEMPLATE": "DAY_LOCATION: Charyn Canyon\nFull-day canyon trip with viewpoints, a valley walk and a picnic lunch."
            },
            {
                "BLOCK_ID": "KOL_2D_KOLSAY_KAINDY",
                "TITLE": "Kolsai & Kaindy Lakes",
                "OUTPUT_TEMPLATE": "DAY 1:\nDAY_LOCATION: Kolsai Lakes\nDAY_OVERNIGHT: Saty\nDrive to the first lake with photo stops and a shore walk.\nDAY 2:\nDAY_LOCATION: Kaindy Lake\nSunken forest lake in the morning, then the return drive to the city."
            },
            {
                "BLOCK_ID": "ALM_DEPARTURE",
                "TITLE": "Departure",
                "OUTPUT_TEMPLATE": "DAY_LOCATION: Hotel, Airport\nTransfer to the airport in good time for the flight."
            }
        ]
    }))
    .unwrap()
}

fn request(days: u32, start: &str, arrival: &str, departure: &str) -> ItineraryRequest {
    ItineraryRequest {
        city: "Almaty".into(),
        start: start.into(),
        days,
        pax: 2,
        kids: 0,
        arrival_time: arrival.into(),
        departure_time: departure.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn five_day_winter_trip_has_realistic_endpoints() {
    let engine = Engine::new(library());
    let (_, it) = engine
        .generate("t1", &request(5, "15.01.2026", "19:30", "10:10"))
        .await
        .unwrap();

    assert_eq!(it.days.len(), 5);
    assert_eq!(it.meta.days_nights, "5D4N");
    assert_eq!(it.meta.season, "Winter");
    assert_eq!(it.meta.tour_month, "January");

    let first = &it.days[0];
    assert_eq!(first.name, "Arrival, Transfer, Dinner, Rest");
    assert!(first.time.starts_with("Time: 19:30"));
    assert_eq!(first.overnight, "Overnight: Almaty");

    let last = it.days.last().unwrap();
    assert_eq!(last.name, "Departure");
    assert_eq!(last.time, "Time: 07:10 – 10:10");
    assert!(last.location.contains("Airport"));
    assert_eq!(last.overnight, "Overnight: -");
}

#[tokio::test]
async fn all_descriptions_fit_the_word_window() {
    let engine = Engine::new(library());
    let (_, it) = engine
        .generate("t2", &request(7, "10.07.2026", "12:00", "18:00"))
        .await
        .unwrap();
    assert_eq!(it.days.len(), 7);
    for day in &it.days {
        let n = word_count(&day.description);
        assert!(
            (MIN_WORDS..=MAX_WORDS).contains(&n),
            "{} has {} words: {}",
            day.number,
            n,
            day.description
        );
    }
}

#[tokio::test]
async fn days_are_contiguous_and_dated_from_start() {
    let engine = Engine::new(library());
    let (_, it) = engine
        .generate("t3", &request(5, "30.12.2026", "12:00", "18:00"))
        .await
        .unwrap();
    for (i, day) in it.days.iter().enumerate() {
        assert_eq!(day.number, format!("Day {}", i + 1));
    }
    assert_eq!(it.days[0].date, "30.12.2026");
    assert_eq!(it.days[2].date, "01.01.2027");
}

#[tokio::test]
async fn notes_pull_in_the_lake_excursion_in_order() {
    let engine = Engine::new(library());
    let mut req = request(6, "10.07.2026", "12:00", "18:00");
    req.notes = "we really want Kolsay lakes".into();
    let (_, it) = engine.generate("t4", &req).await.unwrap();

    let kolsai = it
        .days
        .iter()
        .position(|d| d.location.contains("Kolsai"))
        .expect("kolsai day present");
    let kaindy = it
        .days
        .iter()
        .position(|d| d.location.contains("Kaindy"))
        .expect("kaindy day present");
    assert_eq!(kaindy, kolsai + 1, "kaindy follows kolsai");
    assert_eq!(it.days[kolsai].overnight, "Overnight: Saty");
    assert_eq!(it.days[kaindy].overnight, "Overnight: Almaty");
}

#[tokio::test]
async fn eight_days_in_summer_picks_the_six_day_route() {
    let engine = Engine::new(library());
    let (_, it) = engine
        .generate("t5", &request(8, "10.07.2026", "12:00", "18:00"))
        .await
        .unwrap();
    // the 6-day route is chosen over the 10-day one and padded to 8
    assert_eq!(it.days.len(), 8);
}

#[tokio::test]
async fn overnight_chain_has_no_gaps() {
    let engine = Engine::new(library());
    let (_, it) = engine
        .generate("t6", &request(9, "10.07.2026", "-", "-"))
        .await
        .unwrap();
    for day in &it.days[..it.days.len() - 1] {
        assert!(day.overnight.starts_with("Overnight: "));
        assert_ne!(day.overnight, "Overnight: -", "{} lost its overnight", day.number);
    }
    assert_eq!(it.days.last().unwrap().overnight, "Overnight: -");
}

#[tokio::test]
async fn generation_is_deterministic_across_engines() {
    let req = request(6, "10.07.2026", "19:30", "10:10");
    let (_, a) = Engine::new(library()).generate("x", &req).await.unwrap();
    let (_, b) = Engine::new(library()).generate("y", &req).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn every_requested_day_count_yields_exactly_that_many_days() {
    let engine = Engine::new(library());
    for days in 1..=30u32 {
        let conv = format!("sweep-{}", days);
        let (_, it) = engine
            .generate(&conv, &request(days, "10.07.2026", "12:00", "18:00"))
            .await
            .unwrap();
        assert_eq!(it.days.len() as u32, days, "requested {}", days);
        for (i, day) in it.days.iter().enumerate() {
            assert_eq!(day.number, format!("Day {}", i + 1));
        }
    }
}

#[tokio::test]
async fn preview_text_lists_every_day() {
    let engine = Engine::new(library());
    let (_, it) = engine
        .generate("t8", &request(5, "15.01.2026", "19:30", "10:10"))
        .await
        .unwrap();
    let text = it.to_preview_text();
    for day in &it.days {
        assert!(text.contains(&day.number));
        assert!(text.contains(&day.date));
    }
    assert!(text.contains("Overnight: -"));
}

#[tokio::test]
async fn placeholders_render_from_generated_output() {
    let engine = Engine::new(library());
    let (_, it) = engine
        .generate("t9", &request(5, "15.01.2026", "19:30", "10:10"))
        .await
        .unwrap();
    let map = build_placeholders(&it).unwrap();
    assert_eq!(map["DAY_01_NUMBER"], "Day 1");
    assert_eq!(map["DAY_05_NAME"], "Departure");
    assert_eq!(map["DAY_06_NAME"], "");
    assert_eq!(map["DAYS_NIGHTS"], "5D4N");
    assert_eq!(map["ARRIVAL_TIME"], "19:30");
}
