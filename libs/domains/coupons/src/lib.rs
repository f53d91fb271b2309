//! Coupons Domain
//!
//! Discount codes: creation with per-code uniqueness among active coupons,
//! listing, soft delete, and checkout-time application.

pub mod discount;
pub mod error;
pub mod handlers;
pub mod indexes;
pub mod models;
pub mod service;

pub use discount::calculate_discount;
pub use error::{CouponError, CouponResult};
pub use handlers::ApiDoc;
pub use indexes::indexes;
pub use models::{AppliedCoupon, ApplyCoupon, Coupon, CreateCoupon, DiscountType};
pub use service::CouponService;
