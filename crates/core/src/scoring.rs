use std::cmp::Ordering;

use crate::interests::matches_interest;
use crate::models::Place;

const RATING_WEIGHT: f64 = 2.0;
const RATING_COUNT_CAP: u32 = 5000;
const INTEREST_BONUS: f64 = 1.5;
const MUST_VISIT_BONUS: f64 = 2.5;

#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub place: &'a Place,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome<'a> {
    pub places: Vec<&'a Place>,
    /// Filters would have removed every place, so the full pool was kept.
    pub fallback: bool,
}

/// Drops places that are explicitly closed or priced above the budget.
pub fn filter_places(places: &[Place], budget: Option<i64>) -> FilterOutcome<'_> {
    let filtered = places
        .iter()
        .filter(|place| place.open_now() != Some(false))
        .filter(|place| match (budget, place.price_number()) {
            (Some(budget), Some(price)) => price <= budget,
            _ => true,
        })
        .collect::<Vec<_>>();

    if filtered.is_empty() {
        FilterOutcome {
            places: places.iter().collect(),
            fallback: true,
        }
    } else {
        FilterOutcome {
            places: filtered,
            fallback: false,
        }
    }
}

pub fn score_place(place: &Place, interests: &[String], expanded: &[String]) -> f64 {
    let mut score = 0.0;
    if let Some(rating) = place.rating {
        score += rating * RATING_WEIGHT;
    }
    if let Some(count) = place.rating_count {
        score += f64::from(count.min(RATING_COUNT_CAP)) / 1000.0;
    }
    if matches_interest(place, interests, expanded) {
        score += INTEREST_BONUS;
    }
    if place.is_must_visit {
        score += MUST_VISIT_BONUS;
    }
    score
}

/// Scores, sorts by score descending and keeps the first `limit`. Equal
/// scores keep their incoming order.
pub fn rank_candidates<'a>(
    places: &[&'a Place],
    interests: &[String],
    expanded: &[String],
    limit: usize,
) -> Vec<ScoredCandidate<'a>> {
    let mut scored = places
        .iter()
        .map(|&place| ScoredCandidate {
            place,
            score: score_place(place, interests, expanded),
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored
}
