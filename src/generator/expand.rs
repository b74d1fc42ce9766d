//! Block expansion: turn one content block into one or more day plan
//! fragments by parsing its output template.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ContentBlock, DayPlanFragment};

static DAY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*DAY\s*(\d+)\s*:").unwrap());
static LOCATION_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:DAY_LOCATION|Location)\s*:\s*(.+)$").unwrap());
static OVERNIGHT_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:DAY_OVERNIGHT|Overnight)\s*:\s*(.+)$").unwrap());
static DESCRIPTION_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*DAY_DESCRIPTION\s*:\s*(.+)$").unwrap());

/// Expand a block to day fragments.
///
/// A template is treated as multi-day only when it carries both a "DAY 1:"
/// and a "DAY 2:" marker; a lone marker is presentation noise. Each chunk is
/// mined for explicit field markers, falling back to the first free lines
/// for the description. `city` fills missing overnight values.
pub fn expand_block(block: &ContentBlock, city: &str) -> Vec<DayPlanFragment> {
    let template = block.template_text();

    let markers: Vec<(usize, u32)> = DAY_MARKER
        .captures_iter(template)
        .filter_map(|c| {
            let m = c.get(0)?;
            let n = c.get(1)?.as_str().parse::<u32>().ok()?;
            Some((m.start(), n))
        })
        .collect();
    let has_day1 = markers.iter().any(|(_, n)| *n == 1);
    let has_day2 = markers.iter().any(|(_, n)| *n == 2);

    if !(has_day1 && has_day2) {
        return vec![fragment_from_chunk(block, template, None, city)];
    }

    let mut fragments = Vec::new();
    for (i, (start, n)) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map(|(s, _)| *s).unwrap_or(template.len());
        let chunk = &template[*start..end];
        // drop the "DAY n:" line itself
        let body = chunk.splitn(2, '\n').nth(1).unwrap_or("");
        fragments.push(fragment_from_chunk(block, body, Some(*n), city));
    }
    fragments
}

fn fragment_from_chunk(
    block: &ContentBlock,
    chunk: &str,
    day_index: Option<u32>,
    city: &str,
) -> DayPlanFragment {
    let locations = LOCATION_FIELD
        .captures(chunk)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    let overnight = OVERNIGHT_FIELD
        .captures(chunk)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| city.to_string());

    let description = DESCRIPTION_FIELD
        .captures(chunk)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| free_lines(chunk));
    let description = if description.is_empty() {
        block.what_it_covers.trim().to_string()
    } else {
        description
    };

    let title = match day_index {
        Some(n) => format!("{} — Day {}", block.title.trim(), n),
        None => block.title.trim().to_string(),
    };

    DayPlanFragment {
        block_id: block.block_id.clone(),
        title,
        time: block.suggested_time.trim().to_string(),
        locations,
        overnight,
        description,
    }
}

/// Join the first couple of lines that are not field markers.
fn free_lines(chunk: &str) -> String {
    chunk
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| {
            let upper = l.to_ascii_uppercase();
            !upper.starts_with("DAY_LOCATION")
                && !upper.starts_with("LOCATION:")
                && !upper.starts_with("DAY_OVERNIGHT")
                && !upper.starts_with("OVERNIGHT:")
                && !upper.starts_with("DAY_DESCRIPTION")
        })
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}
