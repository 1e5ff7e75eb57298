use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sayahat_core::{InterestMapping, Place, TravelerPreferences};
use serde::{Deserialize, Serialize};

use crate::{InterestMappingRepository, PlaceCatalog, PreferenceRepository};

/// JSON document used to load a catalog snapshot into a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub preferences: BTreeMap<String, TravelerPreferences>,
    #[serde(default)]
    pub interest_mappings: Vec<InterestMapping>,
}

impl CatalogSeed {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("failed reading catalog seed at {}", path.as_ref().display())
        })?;
        serde_json::from_str(&raw).with_context(|| {
            format!("invalid catalog seed json in {}", path.as_ref().display())
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub places: usize,
    pub preferences: usize,
    pub interest_mappings: usize,
}

pub async fn import_seed<S>(store: &S, seed: CatalogSeed) -> Result<SeedSummary>
where
    S: PlaceCatalog + PreferenceRepository + InterestMappingRepository,
{
    let summary = SeedSummary {
        places: seed.places.len(),
        preferences: seed.preferences.len(),
        interest_mappings: seed.interest_mappings.len(),
    };

    for place in seed.places {
        store.upsert_place(place).await?;
    }
    for (user_id, preferences) in seed.preferences {
        store.upsert_preferences(&user_id, preferences).await?;
    }
    for mapping in seed.interest_mappings {
        store.upsert_interest_mapping(mapping).await?;
    }

    Ok(summary)
}
