//! Refresh escalation: successive user-triggered refreshes raise the
//! generation temperature and, past the second refresh, rephrase the topic.

pub const BASE_TEMPERATURE: f64 = 0.7;
pub const TEMPERATURE_STEP: f64 = 0.1;
pub const MAX_TEMPERATURE: f64 = 1.0;

/// Refresh count at which topic rephrasing starts.
pub const VARIATION_START: u32 = 2;

const VARIATION_PREFIXES: [&str; 5] = [
    "interesting facts about",
    "advanced concepts in",
    "history of",
    "practical applications of",
    "famous people in",
];

/// Temperature for the given refresh count, capped at `MAX_TEMPERATURE`.
#[must_use]
pub fn temperature_for(refresh_count: u32) -> f64 {
    (BASE_TEMPERATURE + f64::from(refresh_count) * TEMPERATURE_STEP).min(MAX_TEMPERATURE)
}

/// Index into the rotating variations, or `None` before rephrasing starts.
#[must_use]
pub fn variation_index(refresh_count: u32) -> Option<usize> {
    let offset = refresh_count.checked_sub(VARIATION_START)?;
    let offset = usize::try_from(offset).ok()?;
    Some(offset % VARIATION_PREFIXES.len())
}

/// The topic phrase to send for this refresh, or `None` to keep `topic` as is.
#[must_use]
pub fn topic_variation(topic: &str, refresh_count: u32) -> Option<String> {
    variation_index(refresh_count).map(|idx| format!("{} {topic}", VARIATION_PREFIXES[idx]))
}
