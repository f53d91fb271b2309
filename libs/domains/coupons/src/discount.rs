//! Discount arithmetic for coupon application

use crate::models::{Coupon, DiscountType};

/// Discount granted on `amount`, rounded to cents.
///
/// Percentage coupons are capped by `maxDiscount`; no coupon takes more than
/// the order itself. Orders below `minOrderAmount` get nothing.
pub fn calculate_discount(coupon: &Coupon, amount: f64) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }
    if coupon.min_order_amount.is_some_and(|min| amount < min) {
        return 0.0;
    }

    let raw = match coupon.discount_type {
        DiscountType::Percentage => {
            let discount = amount * coupon.discount_value / 100.0;
            coupon.max_discount.map_or(discount, |cap| discount.min(cap))
        }
        DiscountType::Fixed => coupon.discount_value,
    };
    round_cents(raw.clamp(0.0, amount))
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
