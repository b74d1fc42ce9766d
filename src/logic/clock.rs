//! Minutes-since-midnight arithmetic for "HH:MM" strings. Unknown times are
//! represented upstream as "-" and parse to `None`.

/// Parse "HH:MM" to minutes since midnight. Returns `None` for "-", empty or
/// malformed input.
pub fn parse_hhmm(s: &str) -> Option<u32> {
    let t = s.trim();
    if t.is_empty() || t == "-" {
        return None;
    }
    let (hh, mm) = t.split_once(':')?;
    let hh: u32 = hh.trim().parse().ok()?;
    let mm: u32 = mm.trim().parse().ok()?;
    if hh > 23 || mm > 59 {
        return None;
    }
    Some(hh * 60 + mm)
}

/// Render minutes since midnight back to "HH:MM".
pub fn format_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}
