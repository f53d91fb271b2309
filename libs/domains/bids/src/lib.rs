//! Bids Domain
//!
//! Vendor offers on products. Listing supports the shared query grammar plus
//! an optional `lat`/`lng` origin that adds a haversine `distanceKm` to each
//! located bid.

pub mod error;
pub mod geo;
pub mod handlers;
pub mod indexes;
pub mod models;
pub mod service;

pub use error::{BidError, BidResult};
pub use geo::{GeoPoint, haversine_km};
pub use handlers::ApiDoc;
pub use indexes::indexes;
pub use models::{Bid, BidStatus, CreateBid, UpdateBid};
pub use service::BidService;
