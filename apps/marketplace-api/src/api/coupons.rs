use axum::Router;
use document_store::MongoStore;
use domain_coupons::{CouponService, handlers, service::COLLECTION};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let store = MongoStore::new(&state.db, COLLECTION);
    let service = CouponService::new(store).with_listing_config(state.config.listing);
    handlers::router(service)
}
