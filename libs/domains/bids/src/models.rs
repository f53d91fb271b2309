use chrono::{DateTime, Utc};
use document_store::timestamp::{now_utc, rfc3339_millis};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::geo::GeoPoint;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BidStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    /// Pulled back by the bidder
    Withdrawn,
}

/// A vendor's offer on a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub product_id: String,
    pub bidder_id: String,
    pub bidder_name: String,
    pub rate: f64,
    /// ISO 4217 code, upper case
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: BidStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "rfc3339_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

/// DTO for placing a bid
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBid {
    #[validate(length(min = 1, max = 64))]
    pub product_id: String,
    #[validate(length(min = 1, max = 64))]
    pub bidder_id: String,
    #[validate(length(min = 1, max = 120))]
    pub bidder_name: String,
    #[validate(range(exclusive_min = 0.0))]
    pub rate: f64,
    #[validate(length(equal = 3))]
    pub currency: String,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
    #[validate(nested)]
    pub location: Option<GeoPoint>,
}

/// DTO for a bid decision or a revised rate
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBid {
    pub status: Option<BidStatus>,
    #[validate(range(exclusive_min = 0.0))]
    pub rate: Option<f64>,
}

impl UpdateBid {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.rate.is_none()
    }
}

impl Bid {
    pub fn new(input: CreateBid) -> Self {
        let now = now_utc();
        Self {
            id: Uuid::now_v7().to_string(),
            product_id: input.product_id,
            bidder_id: input.bidder_id,
            bidder_name: input.bidder_name.trim().to_string(),
            rate: input.rate,
            currency: input.currency.to_uppercase(),
            message: input.message,
            status: BidStatus::Pending,
            location: input.location,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::bson;

    fn input() -> CreateBid {
        CreateBid {
            product_id: "prod-1".into(),
            bidder_id: "vendor-9".into(),
            bidder_name: " Acme Corp ".into(),
            rate: 149.5,
            currency: "eur".into(),
            message: None,
            location: Some(GeoPoint::new(52.52, 13.405)),
        }
    }

    #[test]
    fn test_new_bid_is_pending() {
        let bid = Bid::new(input());
        assert_eq!(bid.status, BidStatus::Pending);
        assert_eq!(bid.bidder_name, "Acme Corp");
        assert_eq!(bid.currency, "EUR");
    }

    #[test]
    fn test_document_shape() {
        let bid = Bid::new(input());
        let document = bson::to_document(&bid).unwrap();

        assert_eq!(document.get_str("productId").unwrap(), "prod-1");
        assert_eq!(document.get_f64("rate").unwrap(), 149.5);
        assert_eq!(document.get_document("location").unwrap().get_f64("lat").unwrap(), 52.52);
        assert!(!document.contains_key("message"));

        let back: Bid = bson::from_document(document).unwrap();
        assert_eq!(back, bid);
    }

    #[test]
    fn test_validation() {
        let mut bad = input();
        bad.rate = 0.0;
        bad.currency = "EURO".into();
        bad.location = Some(GeoPoint::new(91.0, 0.0));
        let errors = bad.validate().unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("rate"));
        assert!(fields.contains_key("currency"));
        assert!(fields.contains_key("location"));

        assert!(UpdateBid::default().is_empty());
        assert!(UpdateBid { status: None, rate: Some(-1.0) }.validate().is_err());
    }
}
