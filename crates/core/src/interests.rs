use std::collections::BTreeMap;

use crate::models::{InterestMapping, Place};

pub const DEFAULT_PROVIDER: &str = "google";

/// Built-in interest -> place-type table used when no stored mapping exists
/// for an interest.
const DEFAULT_INTEREST_TYPES: &[(&str, &[&str])] = &[
    ("museum", &["museum", "art_gallery"]),
    ("art", &["art_gallery", "museum"]),
    ("history", &["historical_landmark", "museum", "monument"]),
    ("architecture", &["historical_landmark", "church", "monument"]),
    ("religion", &["church", "mosque", "synagogue", "hindu_temple"]),
    ("food", &["restaurant", "cafe", "bakery", "meal_takeaway"]),
    ("coffee", &["cafe", "coffee_shop"]),
    ("nightlife", &["bar", "night_club"]),
    ("nature", &["park", "natural_feature", "hiking_area"]),
    ("shopping", &["shopping_mall", "market", "store"]),
    ("family", &["amusement_park", "zoo", "aquarium"]),
    ("beach", &["beach"]),
];

pub fn default_interest_table() -> BTreeMap<String, Vec<String>> {
    DEFAULT_INTEREST_TYPES
        .iter()
        .map(|(interest, types)| {
            (
                interest.to_string(),
                types.iter().map(|value| value.to_string()).collect(),
            )
        })
        .collect()
}

/// Interest synonym table for one provider. Interests missing from the
/// stored table fall back to the built-in entry of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestSynonyms {
    table: BTreeMap<String, Vec<String>>,
}

impl InterestSynonyms {
    pub fn new(table: BTreeMap<String, Vec<String>>) -> Self {
        let table = table
            .into_iter()
            .map(|(interest, types)| {
                (
                    interest.trim().to_lowercase(),
                    types
                        .into_iter()
                        .map(|value| value.trim().to_lowercase())
                        .filter(|value| !value.is_empty())
                        .collect(),
                )
            })
            .filter(|(interest, _): &(String, Vec<String>)| !interest.is_empty())
            .collect();

        Self { table }
    }

    pub fn from_mappings(mappings: &[InterestMapping], provider: &str) -> Self {
        let table = mappings
            .iter()
            .filter_map(|mapping| {
                mapping
                    .types_for(provider)
                    .map(|types| (mapping.name.clone(), types.to_vec()))
            })
            .collect();

        Self::new(table)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn types_for(&self, interest: &str) -> Vec<String> {
        let key = interest.trim().to_lowercase();
        if let Some(types) = self.table.get(&key) {
            return types.clone();
        }

        DEFAULT_INTEREST_TYPES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, types)| types.iter().map(|value| value.to_string()).collect())
            .unwrap_or_default()
    }

    /// Expanded type tokens for the given interests, first occurrence wins.
    pub fn expand(&self, interests: &[String]) -> Vec<String> {
        let mut expanded: Vec<String> = Vec::new();
        for interest in interests {
            for token in self.types_for(interest) {
                if !expanded.contains(&token) {
                    expanded.push(token);
                }
            }
        }
        expanded
    }

    /// Built-in defaults overlaid with the stored table.
    pub fn effective_table(&self) -> BTreeMap<String, Vec<String>> {
        let mut table = default_interest_table();
        for (interest, types) in &self.table {
            table.insert(interest.clone(), types.clone());
        }
        table
    }
}

/// True when the category or a type tag contains an interest, or one of the
/// interests' expanded type tokens, as a substring.
pub fn matches_interest(place: &Place, interests: &[String], expanded: &[String]) -> bool {
    if interests.is_empty() {
        return false;
    }

    let tags = place.tags();
    interests
        .iter()
        .chain(expanded.iter())
        .any(|token| tags.iter().any(|tag| tag.contains(token.as_str())))
}
