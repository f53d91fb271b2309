use std::sync::Arc;

use document_store::bson::{self, Document, doc};
use document_store::json::document_to_json;
use document_store::timestamp::now_utc;
use document_store::{DocumentStore, SoftDeleteCollection};
use query_builder::{ListingConfig, Paginated, QueryBuilder, QueryParams};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::discount::{calculate_discount, round_cents};
use crate::error::{CouponError, CouponResult};
use crate::models::{AppliedCoupon, ApplyCoupon, Coupon, CreateCoupon, normalize_code};

pub const COLLECTION: &str = "coupons";

pub const SEARCHABLE_FIELDS: [&str; 2] = ["code", "description"];

pub const DEFAULT_SORT: &str = "-createdAt";

pub struct CouponService<S: DocumentStore> {
    coupons: Arc<SoftDeleteCollection<S>>,
    listing: ListingConfig,
}

impl<S: DocumentStore> CouponService<S> {
    pub fn new(store: S) -> Self {
        Self {
            coupons: Arc::new(SoftDeleteCollection::new(store)),
            listing: ListingConfig::default(),
        }
    }

    pub fn with_listing_config(mut self, listing: ListingConfig) -> Self {
        self.listing = listing;
        self
    }

    /// Rejects a code already held by another active coupon. The partial
    /// unique index covers the race between this check and the insert.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_coupon(&self, input: CreateCoupon) -> CouponResult<Coupon> {
        input
            .validate()
            .map_err(|e| CouponError::Validation(e.to_string()))?;

        let coupon = Coupon::new(input);
        if coupon.active && self.find_active(&coupon.code).await?.is_some() {
            return Err(CouponError::DuplicateCode(coupon.code));
        }

        self.coupons.insert_one(bson::to_document(&coupon)?).await?;
        tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    #[instrument(skip(self))]
    pub async fn get_coupon(&self, id: Uuid) -> CouponResult<Coupon> {
        let document = self
            .coupons
            .find_one(doc! { "_id": id.to_string() })
            .await?
            .ok_or(CouponError::NotFound(id))?;
        Ok(bson::from_document(document)?)
    }

    #[instrument(skip(self, params))]
    pub async fn list_coupons(&self, params: &QueryParams) -> CouponResult<Paginated<Value>> {
        let page = QueryBuilder::new(self.coupons.query(), params)
            .with_config(self.listing)
            .search(&SEARCHABLE_FIELDS)
            .filter()
            .sort_or(DEFAULT_SORT)
            .paginate()
            .fields()
            .page()
            .await?;
        Ok(page.map(document_to_json))
    }

    #[instrument(skip(self))]
    pub async fn delete_coupon(&self, id: Uuid) -> CouponResult<()> {
        if !self.coupons.soft_delete(doc! { "_id": id.to_string() }).await? {
            return Err(CouponError::NotFound(id));
        }
        tracing::info!(coupon_id = %id, "Coupon soft-deleted");
        Ok(())
    }

    /// Resolves `code` to a usable coupon and prices the order with it.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn apply_coupon(&self, input: ApplyCoupon) -> CouponResult<AppliedCoupon> {
        input
            .validate()
            .map_err(|e| CouponError::Validation(e.to_string()))?;

        let code = normalize_code(&input.code);
        let coupon = match self.find_active(&code).await? {
            Some(coupon) => coupon,
            None => {
                let known = self.coupons.find_one(doc! { "code": &code }).await?.is_some();
                return Err(if known {
                    CouponError::Inactive(code)
                } else {
                    CouponError::UnknownCode(code)
                });
            }
        };
        if coupon.is_expired_at(now_utc()) {
            return Err(CouponError::Expired(code));
        }

        let discount = calculate_discount(&coupon, input.order_amount);
        tracing::debug!(discount, order_amount = input.order_amount, "Coupon applied");
        Ok(AppliedCoupon {
            code,
            order_amount: input.order_amount,
            discount,
            total: round_cents(input.order_amount - discount),
        })
    }

    async fn find_active(&self, code: &str) -> CouponResult<Option<Coupon>> {
        let document = self.coupons.find_one(active_code(code)).await?;
        Ok(document.map(bson::from_document::<Coupon>).transpose()?)
    }
}

impl<S: DocumentStore> Clone for CouponService<S> {
    fn clone(&self) -> Self {
        Self {
            coupons: Arc::clone(&self.coupons),
            listing: self.listing,
        }
    }
}

fn active_code(code: &str) -> Document {
    doc! { "code": code, "active": true }
}
