use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Upper bound accepted from the front end; generation clamps further.
pub const MAX_REQUEST_DAYS: u32 = 30;

/// A single generation request as produced by the conversational front end.
///
/// Transient: consumed once per generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItineraryRequest {
    pub city: String,
    /// Start date as DD.MM.YYYY
    pub start: String,
    pub days: u32,
    pub pax: u32,
    pub kids: u32,
    /// "HH:MM" or "-" when unknown
    pub arrival_time: String,
    /// "HH:MM" or "-" when unknown
    pub departure_time: String,
    pub notes: String,
    /// Optional season override (otherwise derived from the start date)
    pub season: Option<String>,
    /// Optional template key override (otherwise derived from the season)
    pub template_key: Option<String>,
}

impl ItineraryRequest {
    /// Reject malformed input before any generation work starts.
    ///
    /// Content gaps are handled downstream; only caller-input mistakes
    /// (bad date, day count out of range, missing city) are errors here.
    pub fn validate(&self) -> Result<NaiveDate> {
        if self.city.trim().is_empty() {
            return Err(EngineError::InvalidRequest("city is required".into()));
        }
        if self.days < 1 || self.days > MAX_REQUEST_DAYS {
            return Err(EngineError::InvalidRequest(format!(
                "days must be 1–{}, got {}",
                MAX_REQUEST_DAYS, self.days
            )));
        }
        parse_date_ddmmyyyy(&self.start)
    }
}

/// Parse "DD.MM.YYYY" (single-digit day/month tolerated).
pub fn parse_date_ddmmyyyy(s: &str) -> Result<NaiveDate> {
    let t = s.trim();
    let mut parts = t.splitn(3, '.');
    let (dd, mm, yy) = (parts.next(), parts.next(), parts.next());
    if let (Some(dd), Some(mm), Some(yy)) = (dd, mm, yy) {
        if let (Ok(dd), Ok(mm), Ok(yy)) = (dd.parse::<u32>(), mm.parse::<u32>(), yy.parse::<i32>())
        {
            if let Some(date) = NaiveDate::from_ymd_opt(yy, mm, dd) {
                return Ok(date);
            }
        }
    }
    Err(EngineError::InvalidRequest(format!("invalid date: {}", s)))
}

/// Format a date back to "DD.MM.YYYY".
pub fn format_date_ddmmyyyy(d: NaiveDate) -> String {
    format!("{:02}.{:02}.{:04}", d.day(), d.month(), d.year())
}

/// Season title and lowercase template key for a calendar month (1–12).
pub fn season_from_month(month: u32) -> (&'static str, &'static str) {
    match month {
        12 | 1 | 2 => ("Winter", "winter"),
        3..=5 => ("Spring", "spring"),
        6..=8 => ("Summer", "summer"),
        _ => ("Autumn", "autumn"),
    }
}

/// English month name for a calendar month (1–12).
pub fn month_name_en(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    MONTHS[((month - 1) % 12) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(days: u32) -> ItineraryRequest {
        ItineraryRequest {
            city: "Almaty".into(),
            start: "15.01.2026".into(),
            days,
            pax: 2,
            kids: 0,
            arrival_time: "10:30".into(),
            departure_time: "-".into(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_valid_request() {
        let date = request(5).validate().unwrap();
        assert_eq!(format_date_ddmmyyyy(date), "15.01.2026");
    }

    #[test]
    fn rejects_out_of_range_days() {
        assert!(request(0).validate().is_err());
        assert!(request(31).validate().is_err());
    }

    #[test]
    fn rejects_missing_city() {
        let mut req = request(5);
        req.city = "  ".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_bad_date() {
        let mut req = request(5);
        req.start = "2026-01-15".into();
        assert!(req.validate().is_err());
        req.start = "32.01.2026".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn season_lookup_matches_calendar() {
        assert_eq!(season_from_month(1), ("Winter", "winter"));
        assert_eq!(season_from_month(4), ("Spring", "spring"));
        assert_eq!(season_from_month(7), ("Summer", "summer"));
        assert_eq!(season_from_month(10), ("Autumn", "autumn"));
        assert_eq!(season_from_month(12), ("Winter", "winter"));
    }
}
