use crate::models::Place;

const MUSEUM_LIKE: &[&str] = &["museum", "art_gallery", "historical", "temple", "monument"];
const FOOD_LIKE: &[&str] = &["restaurant", "cafe", "bakery", "meal_takeaway", "bar"];

pub fn is_museum_like(place: &Place) -> bool {
    has_any_keyword(place, MUSEUM_LIKE)
}

pub fn is_food_like(place: &Place) -> bool {
    has_any_keyword(place, FOOD_LIKE)
}

fn has_any_keyword(place: &Place, keywords: &[&str]) -> bool {
    place
        .tags()
        .iter()
        .any(|tag| keywords.iter().any(|keyword| tag_has_segment(tag, keyword)))
}

// "historical_landmark" carries "historical"; "barber_shop" does not carry "bar".
fn tag_has_segment(tag: &str, keyword: &str) -> bool {
    let tag = tag
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
        .collect::<String>();
    format!("_{tag}_").contains(&format!("_{keyword}_"))
}
