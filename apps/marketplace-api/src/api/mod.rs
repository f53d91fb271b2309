//! API routes, nested under `/api` by `axum_helpers::create_router`.

pub mod bids;
pub mod contacts;
pub mod coupons;
pub mod health;

use axum::Router;
use document_store::MongoStore;
use mongodb::{Database, IndexModel};
use tracing::info;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/contacts", contacts::router(state))
        .nest("/bids", bids::router(state))
        .nest("/coupons", coupons::router(state))
}

/// Create every collection's indexes at startup.
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    let collections: [(&str, Vec<IndexModel>); 3] = [
        (domain_contacts::service::COLLECTION, domain_contacts::indexes()),
        (domain_bids::service::COLLECTION, domain_bids::indexes()),
        (domain_coupons::service::COLLECTION, domain_coupons::indexes()),
    ];

    for (name, indexes) in collections {
        MongoStore::new(db, name)
            .init_indexes(indexes)
            .await
            .map_err(|e| eyre::eyre!("Failed to create {} indexes: {}", name, e))?;
        info!("{} collection indexes ready", name);
    }
    Ok(())
}
