pub mod category;
pub mod error;
pub mod geo;
pub mod interests;
pub mod models;
pub mod planner;
pub mod preferences;
pub mod scoring;

pub use error::PlannerError;
pub use geo::{haversine_km, Coordinates};
pub use interests::{default_interest_table, InterestSynonyms, DEFAULT_PROVIDER};
pub use models::*;
pub use planner::build_trip_plan;
pub use preferences::{normalize_interests, resolve_preferences, Pace, ResolvedPreferences};
