use crate::models::{TravelerPreferences, TripRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Slow,
    Medium,
    Fast,
}

impl Pace {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "slow" => Some(Self::Slow),
            "medium" => Some(Self::Medium),
            "fast" => Some(Self::Fast),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Medium => "medium",
            Self::Fast => "fast",
        }
    }

    pub fn stops_per_day(self) -> usize {
        match self {
            Self::Slow => 3,
            Self::Medium => 4,
            Self::Fast => 5,
        }
    }
}

/// Unknown labels get medium's stop count.
pub fn stops_for_pace(label: &str) -> usize {
    Pace::parse(label).unwrap_or(Pace::Medium).stops_per_day()
}

/// Request fields after merging with stored preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPreferences {
    pub budget: Option<i64>,
    pub interests: Vec<String>,
    pub travel_style: Option<String>,
    pub pace: String,
    pub stops_per_day: usize,
}

pub fn normalize_interests<I, S>(interests: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    interests
        .into_iter()
        .map(|value| value.as_ref().trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

pub fn resolve_preferences(
    request: &TripRequest,
    stored: Option<&TravelerPreferences>,
) -> ResolvedPreferences {
    let mut budget = request.budget;
    let mut interests = normalize_interests(&request.interests);
    let mut travel_style = non_blank(request.travel_style.as_deref());

    if request.use_preferences {
        if let Some(stored) = stored {
            if budget.is_none() {
                budget = stored.budget;
            }
            if interests.is_empty() {
                interests = normalize_interests(&stored.interests);
            }
            if travel_style.is_none() {
                travel_style = non_blank(stored.travel_style.as_deref());
            }
        }
    }

    let pace = non_blank(request.pace.as_deref()).unwrap_or_else(|| {
        derive_pace(travel_style.as_deref()).as_str().to_string()
    });
    let stops_per_day = stops_for_pace(&pace);

    ResolvedPreferences {
        budget,
        interests,
        travel_style,
        pace,
        stops_per_day,
    }
}

fn derive_pace(travel_style: Option<&str>) -> Pace {
    match travel_style.map(|style| style.trim().to_lowercase()) {
        Some(style) if style == "relax" || style == "slow" => Pace::Slow,
        _ => Pace::Medium,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> TravelerPreferences {
        TravelerPreferences {
            budget: Some(2),
            interests: vec![" Museum ".to_string(), "".to_string(), "FOOD".to_string()],
            travel_style: Some("relax".to_string()),
        }
    }

    #[test]
    fn normalizes_interests() {
        assert_eq!(
            normalize_interests(["  Art ", "", "   ", "NATURE"]),
            vec!["art".to_string(), "nature".to_string()]
        );
    }

    #[test]
    fn request_fields_win_over_stored_preferences() {
        let request = TripRequest {
            budget: Some(0),
            interests: vec!["Beach".to_string()],
            travel_style: Some("adventure".to_string()),
            ..TripRequest::new("Almaty", 2)
        };

        let resolved = resolve_preferences(&request, Some(&stored()));
        assert_eq!(resolved.budget, Some(0));
        assert_eq!(resolved.interests, vec!["beach".to_string()]);
        assert_eq!(resolved.travel_style.as_deref(), Some("adventure"));
        assert_eq!(resolved.pace, "medium");
        assert_eq!(resolved.stops_per_day, 4);
    }

    #[test]
    fn stored_preferences_fill_missing_fields() {
        let resolved = resolve_preferences(&TripRequest::new("Almaty", 2), Some(&stored()));
        assert_eq!(resolved.budget, Some(2));
        assert_eq!(resolved.interests, vec!["museum".to_string(), "food".to_string()]);
        assert_eq!(resolved.travel_style.as_deref(), Some("relax"));
        assert_eq!(resolved.pace, "slow");
        assert_eq!(resolved.stops_per_day, 3);
    }

    #[test]
    fn merge_is_skipped_when_disabled() {
        let request = TripRequest {
            use_preferences: false,
            ..TripRequest::new("Almaty", 2)
        };

        let resolved = resolve_preferences(&request, Some(&stored()));
        assert_eq!(resolved.budget, None);
        assert!(resolved.interests.is_empty());
        assert_eq!(resolved.travel_style, None);
    }

    #[test]
    fn missing_preference_record_passes_fields_through() {
        let request = TripRequest {
            budget: Some(3),
            ..TripRequest::new("Almaty", 1)
        };

        let resolved = resolve_preferences(&request, None);
        assert_eq!(resolved.budget, Some(3));
        assert!(resolved.interests.is_empty());
        assert_eq!(resolved.pace, "medium");
    }

    #[test]
    fn explicit_pace_is_kept_and_unknown_pace_uses_medium_count() {
        let fast = TripRequest {
            pace: Some("fast".to_string()),
            travel_style: Some("relax".to_string()),
            ..TripRequest::new("Almaty", 1)
        };
        let resolved = resolve_preferences(&fast, None);
        assert_eq!(resolved.pace, "fast");
        assert_eq!(resolved.stops_per_day, 5);

        let odd = TripRequest {
            pace: Some("leisurely".to_string()),
            ..TripRequest::new("Almaty", 1)
        };
        let resolved = resolve_preferences(&odd, None);
        assert_eq!(resolved.pace, "leisurely");
        assert_eq!(resolved.stops_per_day, 4);
    }
}
