//! Query variant planning for one target entity.

use lazy_static::lazy_static;
use regex::Regex;

use super::era::{classify_era, EraClass};
use super::significant_words;
use crate::config::PolicySettings;
use crate::content_store::TargetEntity;

lazy_static! {
    static ref PARENTHETICAL: Regex = Regex::new(r"\s*\([^)]*\)").unwrap();
}

/// Produce the ordered, deduplicated query variants for an entity.
///
/// Pure: no network, no clock; identical input yields the identical set.
/// Variants shorter than 3 characters are dropped.
pub fn plan_queries(entity: &TargetEntity, policy: &PolicySettings) -> Vec<String> {
    let mut queries: Vec<String> = Vec::new();
    let title = entity.title.trim();

    push_unique(&mut queries, title.to_string());

    let stripped = strip_qualifiers(title);
    push_unique(&mut queries, stripped.clone());
    push_unique(&mut queries, format!("{} artifact", stripped));

    if classify_era(&entity.era, policy) == EraClass::Ancient {
        push_unique(&mut queries, format!("{} ancient museum", stripped));
        push_unique(&mut queries, format!("{} archaeological", stripped));
    }

    let words = significant_words(title);
    if !words.is_empty() {
        push_unique(&mut queries, words.join(" "));
    }

    queries.retain(|q| q.chars().count() > 2);
    queries
}

/// Strip a parenthetical year annotation and a trailing comma qualifier:
/// "Astrolabe (ca. 1400), brass" -> "Astrolabe".
fn strip_qualifiers(title: &str) -> String {
    let no_parens = PARENTHETICAL.replace_all(title, "");
    let base = match no_parens.split_once(',') {
        Some((head, _)) => head,
        None => &no_parens,
    };
    base.trim().to_string()
}

fn push_unique(queries: &mut Vec<String>, query: String) {
    let query = query.trim().to_string();
    if !query.is_empty() && !queries.contains(&query) {
        queries.push(query);
    }
}
