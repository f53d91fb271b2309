//! Great-circle distance between bid locations and a caller-supplied origin

use document_store::bson::{Bson, Document};
use query_builder::QueryParams;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Mean Earth radius used by [`haversine_km`]
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const LAT_PARAM: &str = "lat";
pub const LNG_PARAM: &str = "lng";
pub const DISTANCE_FIELD: &str = "distanceKm";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct GeoPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Haversine distance in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Takes `lat` and `lng` out of the listing parameters so they never reach
/// the filter stage. Returns the origin only when both parse and are in range.
pub fn take_origin(params: &mut QueryParams) -> Option<GeoPoint> {
    let lat = params.remove(LAT_PARAM);
    let lng = params.remove(LNG_PARAM);
    let lat = lat?.first().trim().parse::<f64>().ok()?;
    let lng = lng?.first().trim().parse::<f64>().ok()?;
    let origin = GeoPoint::new(lat, lng);
    origin.in_range().then_some(origin)
}

/// Adds `distanceKm` (two decimals) to a bid document that carries a location.
pub fn annotate_distance(document: &mut Document, origin: GeoPoint) {
    let Some(location) = document.get_document("location").ok().and_then(point_of) else {
        return;
    };
    let km = (haversine_km(origin, location) * 100.0).round() / 100.0;
    document.insert(DISTANCE_FIELD, km);
}

fn point_of(location: &Document) -> Option<GeoPoint> {
    Some(GeoPoint::new(number(location.get("lat")?)?, number(location.get("lng")?)?))
}

fn number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(n) => Some(*n),
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        _ => None,
    }
}
