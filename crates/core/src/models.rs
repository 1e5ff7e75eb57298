use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

pub type PlaceId = i64;

/// Price level as cached from the places provider. Older rows carry a plain
/// ordinal, newer ones the provider's enum label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceLevel {
    Ordinal(i64),
    Label(String),
}

impl PriceLevel {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Ordinal(value) => Some(*value),
            Self::Label(label) => match label.trim().to_uppercase().as_str() {
                "PRICE_LEVEL_FREE" => Some(0),
                "PRICE_LEVEL_INEXPENSIVE" => Some(1),
                "PRICE_LEVEL_MODERATE" => Some(2),
                "PRICE_LEVEL_EXPENSIVE" => Some(3),
                "PRICE_LEVEL_VERY_EXPENSIVE" => Some(4),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    #[serde(default)]
    pub provider_place_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<u32>,
    #[serde(default)]
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub price_level: Option<PriceLevel>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub is_must_visit: bool,
    #[serde(default)]
    pub cached_at: Option<DateTime<Utc>>,
}

impl Place {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    pub fn open_now(&self) -> Option<bool> {
        self.opening_hours.as_ref().and_then(|hours| hours.open_now)
    }

    pub fn price_number(&self) -> Option<i64> {
        self.price_level.as_ref().and_then(PriceLevel::as_number)
    }

    /// Lowercased category followed by lowercased type tags.
    pub fn tags(&self) -> Vec<String> {
        std::iter::once(self.category.to_lowercase())
            .chain(self.types.iter().map(|value| value.to_lowercase()))
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Case-insensitive city comparison used by every catalog implementation.
pub fn city_matches(place_city: &str, requested: &str) -> bool {
    place_city.trim().to_lowercase() == requested.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerPreferences {
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub travel_style: Option<String>,
}

/// One interest keyword with its place types per provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestMapping {
    pub name: String,
    #[serde(default)]
    pub providers: BTreeMap<String, Vec<String>>,
}

impl InterestMapping {
    pub fn types_for(&self, provider: &str) -> Option<&[String]> {
        self.providers.get(provider).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub city: String,
    pub days: u32,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub pace: Option<String>,
    #[serde(default)]
    pub travel_style: Option<String>,
    #[serde(default = "default_use_preferences")]
    pub use_preferences: bool,
}

impl TripRequest {
    pub fn new(city: impl Into<String>, days: u32) -> Self {
        Self {
            city: city.into(),
            days,
            budget: None,
            interests: Vec::new(),
            pace: None,
            travel_style: None,
            use_preferences: true,
        }
    }
}

fn default_use_preferences() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStop {
    pub id: PlaceId,
    pub name: String,
    pub category: String,
    pub rating: Option<f64>,
    pub address: String,
    pub provider_place_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub price_level: Option<PriceLevel>,
    pub opening_hours: Option<OpeningHours>,
    pub photo_url: Option<String>,
    pub website: Option<String>,
    pub neighborhood: Option<String>,
    pub is_must_visit: bool,
    pub score: f64,
    /// `None` when either the stop or the day's anchor has no coordinates.
    pub distance_from_anchor_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub summary: String,
    pub far_from_center: bool,
    pub stops: Vec<PlannedStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDiagnostics {
    pub places_in_city: usize,
    pub places_after_filters: usize,
    pub filter_fallback: bool,
    pub candidates_ranked: usize,
    pub stops_per_day: usize,
    pub centroid: Option<Coordinates>,
    pub far_days: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub city: String,
    pub days_requested: u32,
    pub days_generated: u32,
    pub budget: Option<i64>,
    pub interests: Vec<String>,
    pub pace: String,
    pub travel_style: Option<String>,
    pub itinerary: Vec<DayPlan>,
    pub tips: Vec<String>,
    pub diagnostics: PlanDiagnostics,
}

impl TripPlan {
    pub fn stop_ids(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.itinerary
            .iter()
            .flat_map(|day| day.stops.iter().map(|stop| stop.id))
    }
}
