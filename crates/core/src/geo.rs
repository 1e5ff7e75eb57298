use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Distance that treats a missing point as infinitely far away.
pub fn distance_or_infinite(from: Option<Coordinates>, to: Option<Coordinates>) -> f64 {
    match (from, to) {
        (Some(from), Some(to)) => haversine_km(from, to),
        _ => f64::INFINITY,
    }
}

pub fn centroid(points: impl IntoIterator<Item = Coordinates>) -> Option<Coordinates> {
    let mut count = 0usize;
    let mut lat_sum = 0.0;
    let mut lng_sum = 0.0;

    for point in points {
        count += 1;
        lat_sum += point.lat;
        lng_sum += point.lng;
    }

    if count == 0 {
        None
    } else {
        Some(Coordinates {
            lat: lat_sum / count as f64,
            lng: lng_sum / count as f64,
        })
    }
}
