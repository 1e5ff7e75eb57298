use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::category::{is_food_like, is_museum_like};
use crate::error::PlannerError;
use crate::geo::{centroid, distance_or_infinite, haversine_km, Coordinates};
use crate::interests::InterestSynonyms;
use crate::models::{
    DayPlan, Place, PlaceId, PlanDiagnostics, PlannedStop, TravelerPreferences, TripPlan,
    TripRequest,
};
use crate::preferences::resolve_preferences;
use crate::scoring::{filter_places, rank_candidates, ScoredCandidate};

pub const NEARBY_RADIUS_KM: f64 = 3.5;
pub const FAR_ANCHOR_KM: f64 = 8.0;
pub const FAR_DAY_MAX_STOPS: usize = 2;
pub const MAX_MUSEUM_STOPS_PER_DAY: usize = 2;
pub const MAX_FOOD_STOPS_PER_DAY: usize = 1;

const SHORT_PLAN_TIP: &str =
    "Not enough cached places for all days. Try adding more categories or reduce trip length.";
const NO_INTERESTS_TIP: &str = "Add interests for more personalized results.";

/// Builds a day-by-day plan from the places cached for `request.city`.
///
/// `places` is the catalog lookup result for the city, in catalog order. That
/// order is the tie-break wherever two candidates score equally, so the same
/// inputs always produce the same plan. Days are assembled greedily around
/// the best remaining place; generation stops early once candidates run out.
pub fn build_trip_plan(
    request: &TripRequest,
    preferences: Option<&TravelerPreferences>,
    places: &[Place],
    synonyms: &InterestSynonyms,
) -> Result<TripPlan, PlannerError> {
    if places.is_empty() {
        return Err(PlannerError::NoPlacesForCity {
            city: request.city.clone(),
        });
    }

    let resolved = resolve_preferences(request, preferences);

    let filtered = filter_places(places, resolved.budget);
    if filtered.fallback {
        debug!(
            city = %request.city,
            budget = ?resolved.budget,
            "filters removed every place, planning from the unfiltered pool"
        );
    }

    let expanded = synonyms.expand(&resolved.interests);
    let total_needed = (request.days as usize).saturating_mul(resolved.stops_per_day);
    let limit = total_needed.saturating_mul(2).max(total_needed);
    let candidates = rank_candidates(&filtered.places, &resolved.interests, &expanded, limit);
    let center = centroid(filtered.places.iter().filter_map(|place| place.coordinates()));

    let mut used = HashSet::new();
    let mut itinerary = Vec::new();
    let mut far_days = Vec::new();

    for day_number in 1..=request.days {
        let Some(day) = assemble_day(&candidates, &mut used, resolved.stops_per_day, center)
        else {
            break;
        };

        if day.far {
            debug!(day = day_number, stops = day.stops.len(), "anchor is far from the city centre");
            far_days.push(day_number);
        }
        itinerary.push(day.into_day_plan(day_number));
    }

    let days_generated = itinerary.len() as u32;

    let mut tips = Vec::new();
    if days_generated < request.days {
        tips.push(SHORT_PLAN_TIP.to_string());
    }
    if resolved.interests.is_empty() {
        tips.push(NO_INTERESTS_TIP.to_string());
    }

    Ok(TripPlan {
        city: request.city.clone(),
        days_requested: request.days,
        days_generated,
        budget: resolved.budget,
        interests: resolved.interests,
        pace: resolved.pace,
        travel_style: resolved.travel_style,
        itinerary,
        tips,
        diagnostics: PlanDiagnostics {
            places_in_city: places.len(),
            places_after_filters: filtered.places.len(),
            filter_fallback: filtered.fallback,
            candidates_ranked: candidates.len(),
            stops_per_day: resolved.stops_per_day,
            centroid: center,
            far_days,
        },
    })
}

struct DraftStop<'a> {
    candidate: ScoredCandidate<'a>,
    distance_km: Option<f64>,
    museum_like: bool,
}

struct DayDraft<'a> {
    anchor: Option<Coordinates>,
    capacity: usize,
    far: bool,
    museums: usize,
    foods: usize,
    stops: Vec<DraftStop<'a>>,
}

impl<'a> DayDraft<'a> {
    fn new(anchor: Option<Coordinates>, capacity: usize, far: bool) -> Self {
        Self {
            anchor,
            capacity,
            far,
            museums: 0,
            foods: 0,
            stops: Vec::with_capacity(capacity),
        }
    }

    fn is_full(&self) -> bool {
        self.stops.len() >= self.capacity
    }

    fn admits(&self, place: &Place) -> bool {
        if is_museum_like(place) && self.museums >= MAX_MUSEUM_STOPS_PER_DAY {
            return false;
        }
        if is_food_like(place) && self.foods >= MAX_FOOD_STOPS_PER_DAY {
            return false;
        }
        true
    }

    fn push(&mut self, candidate: ScoredCandidate<'a>, used: &mut HashSet<PlaceId>) {
        let place = candidate.place;
        let museum_like = is_museum_like(place);
        if museum_like {
            self.museums += 1;
        }
        if is_food_like(place) {
            self.foods += 1;
        }

        let distance_km = match (self.anchor, place.coordinates()) {
            (Some(anchor), Some(point)) => Some(haversine_km(anchor, point)),
            _ => None,
        };

        used.insert(place.id);
        self.stops.push(DraftStop {
            candidate,
            distance_km,
            museum_like,
        });
    }

    fn try_push(&mut self, candidate: ScoredCandidate<'a>, used: &mut HashSet<PlaceId>) {
        if self.is_full() || used.contains(&candidate.place.id) || !self.admits(candidate.place) {
            return;
        }
        self.push(candidate, used);
    }

    fn into_day_plan(mut self, day: u32) -> DayPlan {
        // museums go in the morning; sort is stable so insertion order holds otherwise
        self.stops.sort_by_key(|stop| !stop.museum_like);

        let stops = self
            .stops
            .into_iter()
            .map(|stop| planned_stop(stop.candidate, stop.distance_km))
            .collect::<Vec<_>>();
        let names = stops
            .iter()
            .map(|stop| stop.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        DayPlan {
            day,
            summary: format!("Day {}: {}", day, names),
            far_from_center: self.far,
            stops,
        }
    }
}

fn assemble_day<'a>(
    candidates: &[ScoredCandidate<'a>],
    used: &mut HashSet<PlaceId>,
    stops_per_day: usize,
    center: Option<Coordinates>,
) -> Option<DayDraft<'a>> {
    let anchor = *candidates
        .iter()
        .find(|candidate| !used.contains(&candidate.place.id))?;
    let anchor_point = anchor.place.coordinates();

    let far = match (anchor_point, center) {
        (Some(point), Some(center)) => haversine_km(point, center) >= FAR_ANCHOR_KM,
        _ => false,
    };
    let capacity = if far {
        stops_per_day.min(FAR_DAY_MAX_STOPS)
    } else {
        stops_per_day
    };

    let mut day = DayDraft::new(anchor_point, capacity, far);
    day.push(anchor, used);

    let mut by_distance = candidates
        .iter()
        .filter(|candidate| !used.contains(&candidate.place.id))
        .map(|candidate| {
            (
                *candidate,
                distance_or_infinite(anchor_point, candidate.place.coordinates()),
            )
        })
        .collect::<Vec<_>>();
    by_distance.sort_by(|(a, a_km), (b, b_km)| {
        a_km.partial_cmp(b_km)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });

    for (candidate, _) in by_distance
        .iter()
        .filter(|(_, km)| *km <= NEARBY_RADIUS_KM)
    {
        if day.is_full() {
            break;
        }
        day.try_push(*candidate, used);
    }

    for (candidate, _) in &by_distance {
        if day.is_full() {
            break;
        }
        day.try_push(*candidate, used);
    }

    if day.far && day.foods == 0 && !day.is_full() {
        let food = candidates
            .iter()
            .find(|candidate| !used.contains(&candidate.place.id) && is_food_like(candidate.place))
            .copied();
        if let Some(food) = food {
            day.push(food, used);
        }
    }

    Some(day)
}

fn planned_stop(candidate: ScoredCandidate<'_>, distance_km: Option<f64>) -> PlannedStop {
    let place = candidate.place;
    PlannedStop {
        id: place.id,
        name: place.name.clone(),
        category: place.category.clone(),
        rating: place.rating,
        address: place.address.clone(),
        provider_place_id: place.provider_place_id.clone(),
        lat: place.lat,
        lng: place.lng,
        price_level: place.price_level.clone(),
        opening_hours: place.opening_hours.clone(),
        photo_url: place.photo_url.clone(),
        website: place.website.clone(),
        neighborhood: place.neighborhood.clone(),
        is_must_visit: place.is_must_visit,
        score: candidate.score,
        distance_from_anchor_km: distance_km,
    }
}
