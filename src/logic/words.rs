//! Description length enforcement. Every rendered description must land in
//! the 20–35 word window; this module pads short text with stock sentences
//! and truncates long text, converging in one pass.

pub const MIN_WORDS: usize = 20;
pub const MAX_WORDS: usize = 35;

/// Stock sentences appended to short descriptions, tried in order.
pub const PADS: [&str; 3] = [
    "Your guide will help keep the pace comfortable with short breaks and photo stops along the way.",
    "Transfers are arranged for comfort and safety, with time to relax between highlights.",
    "Enjoy a smooth itinerary flow with easy logistics and time for rest.",
];

/// Replacement text for a completely empty description.
pub const EMPTY_PAD: &str = "Your private guide will help with timing, breaks, and the best photo stops, \
     keeping the day comfortable and well-paced.";

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn truncate_words(s: &str, n: usize) -> String {
    let mut out = s
        .split_whitespace()
        .take(n)
        .collect::<Vec<_>>()
        .join(" ");
    if !out.ends_with('.') && !out.ends_with('!') && !out.ends_with('?') {
        out.push('.');
    }
    out
}

/// Bring a description into the word window. Whitespace is collapsed, empty
/// text becomes the stock description, short text gains the first pad that
/// lands in range, long text is cut at the limit. Applying the result again
/// is a no-op.
pub fn enforce_length(desc: &str) -> String {
    let mut text = desc.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        text = EMPTY_PAD.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    loop {
        let n = word_count(&text);
        if n > MAX_WORDS {
            return truncate_words(&text, MAX_WORDS);
        }
        if n >= MIN_WORDS {
            return text;
        }
        let pad = PADS
            .iter()
            .find(|p| {
                let total = n + word_count(p);
                (MIN_WORDS..=MAX_WORDS).contains(&total)
            })
            .or_else(|| PADS.iter().find(|p| n + word_count(p) <= MAX_WORDS))
            .unwrap_or(&PADS[0]);
        text.push(' ');
        text.push_str(pad);
    }
}
