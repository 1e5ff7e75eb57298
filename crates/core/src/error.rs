use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    #[error("no places cached for city `{city}`")]
    NoPlacesForCity { city: String },
}
