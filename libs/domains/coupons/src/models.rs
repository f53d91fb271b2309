use chrono::{DateTime, Utc};
use document_store::timestamp::{now_utc, rfc3339_millis};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiscountType {
    /// `discountValue` percent of the order amount
    Percentage,
    /// Flat `discountValue` off the order
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Upper case; unique among active coupons
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    #[serde(
        default,
        with = "rfc3339_millis::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "rfc3339_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_discount"))]
pub struct CreateCoupon {
    #[validate(length(min = 3, max = 32), custom(function = "validate_code"))]
    pub code: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[validate(range(exclusive_min = 0.0))]
    pub discount_value: f64,
    #[validate(range(min = 0.0))]
    pub min_order_amount: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub max_discount: Option<f64>,
    #[serde(default, with = "rfc3339_millis::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

/// Checkout request: a code and the order amount it should apply to
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCoupon {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[validate(range(min = 0.0))]
    pub order_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub order_amount: f64,
    pub discount: f64,
    pub total: f64,
}

fn active_by_default() -> bool {
    true
}

fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("coupon_code"))
    }
}

fn validate_discount(input: &CreateCoupon) -> Result<(), ValidationError> {
    if input.discount_type == DiscountType::Percentage && input.discount_value > 100.0 {
        return Err(ValidationError::new("percentage_above_100"));
    }
    Ok(())
}

/// Upper-cased, trimmed form used for storage and lookup.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Coupon {
    pub fn new(input: CreateCoupon) -> Self {
        let now = now_utc();
        Self {
            id: Uuid::now_v7().to_string(),
            code: normalize_code(&input.code),
            description: input.description,
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            min_order_amount: input.min_order_amount,
            max_discount: input.max_discount,
            expires_at: input.expires_at,
            active: input.active,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use document_store::bson;

    fn input() -> CreateCoupon {
        CreateCoupon {
            code: " spring-25 ".into(),
            description: Some("Spring sale".into()),
            discount_type: DiscountType::Percentage,
            discount_value: 25.0,
            min_order_amount: Some(50.0),
            max_discount: None,
            expires_at: None,
            active: true,
        }
    }

    #[test]
    fn test_new_coupon_normalizes_code() {
        let coupon = Coupon::new(input());
        assert_eq!(coupon.code, "SPRING-25");
        assert!(coupon.active);
    }

    #[test]
    fn test_expiry() {
        let now = now_utc();
        let mut coupon = Coupon::new(input());
        assert!(!coupon.is_expired_at(now));

        coupon.expires_at = Some(now - Duration::minutes(1));
        assert!(coupon.is_expired_at(now));

        coupon.expires_at = Some(now + Duration::days(1));
        assert!(!coupon.is_expired_at(now));
    }

    #[test]
    fn test_document_shape() {
        let mut coupon = Coupon::new(input());
        coupon.expires_at = Some(now_utc());
        let document = bson::to_document(&coupon).unwrap();

        assert_eq!(document.get_str("discountType").unwrap(), "percentage");
        assert!(document.get_str("expiresAt").unwrap().ends_with('Z'));
        assert!(!document.contains_key("maxDiscount"));

        let back: Coupon = bson::from_document(document).unwrap();
        assert_eq!(back, coupon);
    }

    #[test]
    fn test_validation() {
        assert!(input().validate().is_ok());

        let mut over = input();
        over.discount_value = 150.0;
        assert!(over.validate().is_err());

        let mut fixed = input();
        fixed.discount_type = DiscountType::Fixed;
        fixed.discount_value = 150.0;
        assert!(fixed.validate().is_ok());

        let mut bad_code = input();
        bad_code.code = "10% OFF".into();
        assert!(bad_code.validate().unwrap_err().field_errors().contains_key("code"));
    }
}
