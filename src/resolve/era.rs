//! Era classification from free-text date labels.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::PolicySettings;

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"\b(\d{3,4})\b").unwrap();
}

/// Coarse era classification driving query planning, plausibility rules
/// and the speculative short-circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraClass {
    Ancient,
    Modern,
    Speculative,
}

/// Classify a free-text era label.
///
/// An explicit BCE/BC marker or the word "ancient" wins outright; otherwise
/// the first 3-4 digit year decides against the policy thresholds. Labels
/// with neither are treated as modern.
pub fn classify_era(era: &str, policy: &PolicySettings) -> EraClass {
    let lower = era.to_lowercase();

    let has_bce_marker = lower
        .split_whitespace()
        .any(|token| matches!(token.trim_matches(|c: char| c == ',' || c == '.'), "bce" | "bc" | "b.c" | "b.c.e"));
    if has_bce_marker || lower.contains("ancient") {
        return EraClass::Ancient;
    }

    if let Some(caps) = YEAR.captures(&lower) {
        if let Ok(year) = caps[1].parse::<i32>() {
            if year >= policy.speculative_year_floor {
                return EraClass::Speculative;
            }
            if year < policy.ancient_year_ceiling {
                return EraClass::Ancient;
            }
        }
    }

    EraClass::Modern
}
