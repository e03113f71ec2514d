//! Matching the authority's free-text shade rows to shade categories.
//!
//! `safeTimeResults` is unordered and its descriptions carry extra text
//! ("Direkt solljus (grad 3)"), so each row is matched case-insensitively by
//! substring against the fixed phrases. The first matching row per category
//! wins; categories without a match stay `None`.

use crate::ingest::suntime::SafeTimeEntry;
use crate::model::{SafeTimes, ShadeCategory};

pub fn match_safe_times(entries: &[SafeTimeEntry]) -> SafeTimes {
    let mut times = SafeTimes::default();
    let mut matched = [false; ShadeCategory::ALL.len()];

    for entry in entries {
        let Some(description) = entry.shadow_description.as_deref() else {
            continue;
        };
        let description = description.to_lowercase();

        for (i, category) in ShadeCategory::ALL.into_iter().enumerate() {
            if !matched[i] && description.contains(category.phrase()) {
                matched[i] = true;
                *times.slot_mut(category) = entry.safe_time;
            }
        }
    }

    times
}
