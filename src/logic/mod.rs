//! Travel-logic post-fix engine.
//!
//! Generation and editing both funnel their output through [`PostFix`],
//! which normalizes presentation labels, enforces arrival/departure realism,
//! keeps multi-day excursions coherent and holds every description inside
//! the 20–35 word window. The pass is deterministic and idempotent:
//! applying it to its own output changes nothing.

pub mod clock;
pub mod words;

use chrono::Duration;
use tracing::{debug, warn};

use crate::services::completion::{CompletionOptions, TextCompletion};
use crate::types::request::{format_date_ddmmyyyy, parse_date_ddmmyyyy};
use crate::types::Itinerary;
use clock::{format_hhmm, parse_hhmm};
use words::{enforce_length, word_count, MAX_WORDS, MIN_WORDS};

const ARRIVAL_LATE_NAME: &str = "Arrival, Transfer, Check-in, Rest";
const ARRIVAL_LATE_DESC: &str = "After landing, you'll complete airport formalities and meet your private driver. \
     Transfer to the hotel, check in, and rest to recover from the flight and get ready \
     for the active days ahead.";

const ARRIVAL_EVENING_NAME: &str = "Arrival, Transfer, Dinner, Rest";
const ARRIVAL_EVENING_DESC: &str = "Arrive in the evening and meet your private driver. After customs and baggage, \
     transfer to the hotel for check-in, then enjoy a calm dinner near your hotel and \
     take time to rest and settle in.";

const ARRIVAL_UNKNOWN_NAME: &str = "Arrival, Transfer, Check-in";
const ARRIVAL_UNKNOWN_DESC: &str = "Meet your driver after landing and transfer to the hotel for check-in. The first \
     day stays flexible around your actual arrival, with time to rest and settle in.";

const ARRIVAL_EARLY_NAME: &str = "Arrival & Light City Walk";
const ARRIVAL_EARLY_DESC: &str = "Arrive and meet your private driver for the transfer to the hotel. After \
     check-in, enjoy a light walk in the city center at an easy pace before dinner.";

const DEPARTURE_NAME: &str = "Departure";
const DEPARTURE_LOCATION: &str = "Visited Locations: Hotel, Airport";
const DEPARTURE_KNOWN_DESC: &str = "Depending on your flight time, enjoy light free time or breakfast, then check \
     out. Your private driver will transfer you to the airport early enough for \
     check-in, security, and a comfortable departure.";
const DEPARTURE_UNKNOWN_DESC: &str = "After breakfast and checkout, your driver will transfer you to the airport in \
     good time for your flight. Timing stays flexible until the departure details are \
     confirmed, so plan a calm final morning.";

const LONG_TRIP_DESC: &str = "The day starts early for the long drive and returns late in the evening. Expect \
     scenic stops, a relaxed pace on the road, and a calm evening at the hotel \
     afterwards.";
const COMFORT_SENTENCE: &str =
    "Transfers are arranged for comfort on the long drive, with regular breaks and photo stops.";
// substrings that prove a description already went through the long-trip fix
const COMFORT_MARK: &str = "regular breaks and photo stops";
const LONG_TRIP_MARK: &str = "calm evening at the hotel";

const LAKE_FIRST_NAME: &str = "Kolsai Lakes — Day 1";
const LAKE_FIRST_LOCATION: &str = "Visited Locations: Kolsai Lakes";
const LAKE_FIRST_DESC: &str = "An early start for the scenic mountain drive to the first lake, with photo stops \
     along the way. After a relaxed shore walk, settle in overnight at a local \
     guesthouse nearby.";
const LAKE_SECOND_NAME: &str = "Kaindy Lake & Return — Day 2";
const LAKE_SECOND_LOCATION: &str = "Visited Locations: Kaindy Lake";
const LAKE_SECOND_DESC: &str = "Continue to the second lake in the morning while the light is best, then begin \
     the return drive to the city with stops for lunch and rest, arriving back in the \
     evening.";
const LAKE_TIME: &str = "Time: Full day";

const GENERIC_DAY_NAME: &str = "City Highlights & Leisure";
const GENERIC_DAY_TIME: &str = "Time: 10:00 – 17:00";
const GENERIC_DAY_LOCATION: &str = "Visited Locations: City Center, Panfilov Park, Green Bazaar";
const GENERIC_DAY_DESC: &str = "Enjoy a relaxed day of city highlights at your own pace, combining central \
     walks, coffee stops, and local markets, with free time in the afternoon to rest \
     or explore further.";

/// Region-specific keyword tables driving the trip and lake rules. The
/// defaults describe the Almaty region; other destinations supply their own
/// tables.
#[derive(Debug, Clone)]
pub struct RegionRules {
    /// lowercase substrings marking a long out-of-town trip
    pub trip_keywords: Vec<String>,
    /// lowercase substrings that cannot coexist with a late return
    pub evening_keywords: Vec<String>,
    /// lowercase substrings naming the first lake stop
    pub first_lake_keywords: Vec<String>,
    /// lowercase substrings naming the second lake stop
    pub second_lake_keywords: Vec<String>,
    /// overnight settlement between the two lake days
    pub lake_overnight: String,
}

impl Default for RegionRules {
    fn default() -> Self {
        let lower = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            trip_keywords: lower(&[
                "charyn",
                "kolsai",
                "kolsay",
                "kaindy",
                "altyn emel",
                "big almaty lake",
                "canyon",
                "national park",
            ]),
            evening_keywords: lower(&["night walk", "shopping", "mall"]),
            first_lake_keywords: lower(&["kolsai", "kolsay"]),
            second_lake_keywords: lower(&["kaindy"]),
            lake_overnight: "Saty".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LakeStop {
    First,
    Second,
}

/// The deterministic post-fix pass.
#[derive(Debug, Clone, Default)]
pub struct PostFix {
    rules: RegionRules,
}

impl PostFix {
    pub fn new(rules: RegionRules) -> Self {
        Self { rules }
    }

    /// Run the full rule chain in place. Pure and idempotent.
    pub fn apply(&self, it: &mut Itinerary) {
        if it.days.is_empty() {
            return;
        }
        self.normalize_labels(it);
        self.fix_arrival(it);
        self.fix_departure(it);
        self.fix_long_trips(it);
        self.fix_lake_chain(it);
        self.fix_duplicate_days(it);
        self.fix_overnights(it);
        self.normalize_labels(it);
        for day in &mut it.days {
            day.description = enforce_length(&day.description);
        }
    }

    /// LLM-assisted variant: descriptions outside the word window are first
    /// offered to the completion service for a natural rewrite, then the
    /// pure pass runs as the backstop. Completion failures are tolerated.
    pub async fn apply_with(&self, it: &mut Itinerary, svc: &dyn TextCompletion) {
        for day in &mut it.days {
            let n = word_count(&day.description);
            if day.description.trim().is_empty() || (MIN_WORDS..=MAX_WORDS).contains(&n) {
                continue;
            }
            let prompt = crate::services::prompts::rewrite_description_prompt(
                MIN_WORDS,
                MAX_WORDS,
                &day.description,
            );
            match svc
                .complete(&prompt, &CompletionOptions { max_tokens: 160 })
                .await
            {
                Ok(text) => {
                    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    let m = word_count(&cleaned);
                    if (MIN_WORDS..=MAX_WORDS).contains(&m) {
                        day.description = cleaned;
                    }
                }
                Err(err) => {
                    warn!(target: "itinera::postfix", error = %err, "description rewrite failed, using local fix");
                }
            }
        }
        self.apply(it);
    }

    /// Force day numbering, recompute dates from the start date and put
    /// every labeled field into canonical "Label: value" form.
    fn normalize_labels(&self, it: &mut Itinerary) {
        let start = parse_date_ddmmyyyy(&it.meta.start).ok();
        for (i, day) in it.days.iter_mut().enumerate() {
            day.number = format!("Day {}", i + 1);
            if let Some(start) = start {
                day.date = format_date_ddmmyyyy(start + Duration::days(i as i64));
            }
            day.name = day.name.trim().to_string();
            day.time = normalize_time_label(&day.time);
            day.location = normalize_location_label(&day.location);
            day.overnight = normalize_overnight_label(&day.overnight);
        }
    }

    fn fix_arrival(&self, it: &mut Itinerary) {
        let city = it.meta.city.clone();
        let day = match it.days.first_mut() {
            Some(day) => day,
            None => return,
        };
        match parse_hhmm(&it.meta.arrival_time) {
            None => {
                day.name = ARRIVAL_UNKNOWN_NAME.into();
                day.time = "Time: Flexible".into();
                day.location = "Visited Locations: Airport, Hotel".into();
                day.overnight = format!("Overnight: {}", city);
                day.description = ARRIVAL_UNKNOWN_DESC.into();
            }
            Some(arr) if arr >= 21 * 60 => {
                let end = (arr + 60).clamp(21 * 60 + 90, 23 * 60 + 59);
                day.name = ARRIVAL_LATE_NAME.into();
                day.time = format!("Time: {} – {}", format_hhmm(arr), format_hhmm(end));
                day.location = "Visited Locations: Airport, Hotel".into();
                day.overnight = format!("Overnight: {}", city);
                day.description = ARRIVAL_LATE_DESC.into();
            }
            Some(arr) if arr >= 18 * 60 => {
                let end = (arr + 210).min(23 * 60 + 30);
                day.name = ARRIVAL_EVENING_NAME.into();
                day.time = format!("Time: {} – {}", format_hhmm(arr), format_hhmm(end));
                day.location = "Visited Locations: Airport, Hotel".into();
                day.overnight = format!("Overnight: {}", city);
                day.description = ARRIVAL_EVENING_DESC.into();
            }
            Some(arr) if arr <= 15 * 60 => {
                // early arrival leaves generated content alone and only
                // fills gaps
                if day.name.is_empty() {
                    day.name = ARRIVAL_EARLY_NAME.into();
                }
                if day.time.is_empty() {
                    let start = (arr + 120).max(16 * 60);
                    let end = (start + 240).min(23 * 60);
                    day.time = format!("Time: {} – {}", format_hhmm(start), format_hhmm(end));
                }
                if day.location.is_empty() {
                    day.location = "Visited Locations: City Center".into();
                }
                if day.overnight.is_empty() {
                    day.overnight = format!("Overnight: {}", city);
                }
                if day.description.trim().is_empty() {
                    day.description = ARRIVAL_EARLY_DESC.into();
                }
            }
            Some(_) => {}
        }
    }

    fn fix_departure(&self, it: &mut Itinerary) {
        let day = match it.days.last_mut() {
            Some(day) => day,
            None => return,
        };
        day.name = DEPARTURE_NAME.into();
        day.location = DEPARTURE_LOCATION.into();
        day.overnight = "Overnight: -".into();
        match parse_hhmm(&it.meta.departure_time) {
            Some(dep) => {
                let start = dep.saturating_sub(180);
                day.time = format!("Time: {} – {}", format_hhmm(start), format_hhmm(dep));
                if day.description.trim().is_empty() {
                    day.description = DEPARTURE_KNOWN_DESC.into();
                }
            }
            None => {
                if day.description.trim().is_empty() {
                    day.description = DEPARTURE_UNKNOWN_DESC.into();
                }
            }
        }
    }

    /// Long out-of-town trips return late. Evening-only plans in the same
    /// description are replaced; otherwise a transfer-comfort sentence is
    /// appended once.
    fn fix_long_trips(&self, it: &mut Itinerary) {
        for day in &mut it.days {
            let hay = format!("{} {} {}", day.name, day.location, day.description).to_lowercase();
            if !self.rules.trip_keywords.iter().any(|k| hay.contains(k)) {
                continue;
            }
            let desc_lower = day.description.to_lowercase();
            if desc_lower.contains(COMFORT_MARK) || desc_lower.contains(LONG_TRIP_MARK) {
                continue;
            }
            if self.rules.evening_keywords.iter().any(|k| desc_lower.contains(k)) {
                debug!(target: "itinera::postfix", day = %day.number, "evening plan conflicts with long trip");
                day.description = LONG_TRIP_DESC.into();
            } else if day.description.trim().is_empty() {
                day.description = LONG_TRIP_DESC.into();
            } else {
                day.description = format!("{} {}", day.description.trim(), COMFORT_SENTENCE);
            }
        }
    }

    fn lake_class(&self, location: &str, name: &str) -> Option<LakeStop> {
        let classify = |text: &str| {
            let t = text.to_lowercase();
            if self.rules.second_lake_keywords.iter().any(|k| t.contains(k)) {
                Some(LakeStop::Second)
            } else if self.rules.first_lake_keywords.iter().any(|k| t.contains(k)) {
                Some(LakeStop::First)
            } else {
                None
            }
        };
        classify(location).or_else(|| classify(name))
    }

    /// The two-lake excursion must run first stop, then second stop with
    /// the return. Reversed adjacent days are swapped, then the pair is
    /// forced into its canonical shape.
    fn fix_lake_chain(&self, it: &mut Itinerary) {
        let city = it.meta.city.clone();
        let classes: Vec<Option<LakeStop>> = it
            .days
            .iter()
            .map(|d| self.lake_class(&d.location, &d.name))
            .collect();
        let pair = classes.windows(2).position(|w| {
            matches!(
                (w[0], w[1]),
                (Some(LakeStop::First), Some(LakeStop::Second))
                    | (Some(LakeStop::Second), Some(LakeStop::First))
            )
        });
        let i = match pair {
            Some(i) => i,
            None => return,
        };
        if classes[i] == Some(LakeStop::Second) {
            debug!(target: "itinera::postfix", index = i, "lake days were reversed, swapping");
            it.days.swap(i, i + 1);
        }

        let first = &mut it.days[i];
        first.name = LAKE_FIRST_NAME.into();
        first.time = LAKE_TIME.into();
        first.location = LAKE_FIRST_LOCATION.into();
        first.overnight = format!("Overnight: {}", self.rules.lake_overnight);
        first.description = LAKE_FIRST_DESC.into();

        let second = &mut it.days[i + 1];
        second.name = LAKE_SECOND_NAME.into();
        second.time = LAKE_TIME.into();
        second.location = LAKE_SECOND_LOCATION.into();
        second.overnight = format!("Overnight: {}", city);
        second.description = LAKE_SECOND_DESC.into();
    }

    /// Adjacent days with the same name and location read as copy-paste
    /// mistakes. The later one becomes a generic leisure day.
    fn fix_duplicate_days(&self, it: &mut Itinerary) {
        for i in 0..it.days.len().saturating_sub(1) {
            let same = it.days[i].name.eq_ignore_ascii_case(&it.days[i + 1].name)
                && it.days[i]
                    .location
                    .eq_ignore_ascii_case(&it.days[i + 1].location);
            if !same || it.days[i + 1].name == GENERIC_DAY_NAME {
                continue;
            }
            let later = &mut it.days[i + 1];
            later.name = GENERIC_DAY_NAME.into();
            later.time = GENERIC_DAY_TIME.into();
            later.location = GENERIC_DAY_LOCATION.into();
            later.description = GENERIC_DAY_DESC.into();
        }
    }

    /// Every non-final day sleeps somewhere; blanks and "-" default to the
    /// base city. The final day keeps "Overnight: -".
    fn fix_overnights(&self, it: &mut Itinerary) {
        let city = it.meta.city.clone();
        let len = it.days.len();
        for day in it.days.iter_mut().take(len.saturating_sub(1)) {
            let v = day.overnight.trim();
            if v.is_empty() || v == "-" || v.eq_ignore_ascii_case("Overnight: -") {
                day.overnight = format!("Overnight: {}", city);
            }
        }
    }
}

fn strip_label<'a>(s: &'a str, labels: &[&str]) -> &'a str {
    let t = s.trim();
    for label in labels {
        if t.len() >= label.len()
            && t.is_char_boundary(label.len())
            && t[..label.len()].eq_ignore_ascii_case(label)
        {
            return t[label.len()..].trim();
        }
    }
    t
}

/// "10:00 – 18:00" or "Time:10:00 – 18:00" both become
/// "Time: 10:00 – 18:00"; empty stays empty.
pub fn normalize_time_label(raw: &str) -> String {
    let v = strip_label(raw, &["time:"]);
    if v.is_empty() {
        String::new()
    } else {
        format!("Time: {}", v)
    }
}

pub fn normalize_location_label(raw: &str) -> String {
    let v = strip_label(raw, &["visited locations:", "locations:", "location:"]);
    if v.is_empty() {
        String::new()
    } else {
        format!("Visited Locations: {}", v)
    }
}

pub fn normalize_overnight_label(raw: &str) -> String {
    let v = strip_label(raw, &["overnight:"]);
    if v.is_empty() {
        String::new()
    } else {
        format!("Overnight: {}", v)
    }
}
