use std::sync::Arc;

use document_store::bson::{self, Document, doc};
use document_store::json::document_to_json;
use document_store::timestamp::now_timestamp;
use document_store::{DocumentStore, SoftDeleteCollection};
use query_builder::{ListingConfig, Paginated, QueryBuilder, QueryParams};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{BidError, BidResult};
use crate::geo::{annotate_distance, take_origin};
use crate::models::{Bid, CreateBid, UpdateBid};

pub const COLLECTION: &str = "bids";

pub const SEARCHABLE_FIELDS: [&str; 2] = ["bidderName", "message"];

pub const DEFAULT_SORT: &str = "-createdAt";

pub struct BidService<S: DocumentStore> {
    bids: Arc<SoftDeleteCollection<S>>,
    listing: ListingConfig,
}

impl<S: DocumentStore> BidService<S> {
    pub fn new(store: S) -> Self {
        Self {
            bids: Arc::new(SoftDeleteCollection::new(store)),
            listing: ListingConfig::default(),
        }
    }

    pub fn with_listing_config(mut self, listing: ListingConfig) -> Self {
        self.listing = listing;
        self
    }

    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn place_bid(&self, input: CreateBid) -> BidResult<Bid> {
        input
            .validate()
            .map_err(|e| BidError::Validation(e.to_string()))?;

        let bid = Bid::new(input);
        self.bids.insert_one(bson::to_document(&bid)?).await?;
        tracing::info!(bid_id = %bid.id, rate = bid.rate, "Bid placed");
        Ok(bid)
    }

    #[instrument(skip(self))]
    pub async fn get_bid(&self, id: Uuid) -> BidResult<Bid> {
        let document = self
            .bids
            .find_one(by_id(id))
            .await?
            .ok_or(BidError::NotFound(id))?;
        Ok(bson::from_document(document)?)
    }

    /// `lat`/`lng` never act as filters; when both are valid every located
    /// bid on the page gets a `distanceKm` from that origin.
    #[instrument(skip(self, params))]
    pub async fn list_bids(&self, params: &QueryParams) -> BidResult<Paginated<Value>> {
        let mut params = params.clone();
        let origin = take_origin(&mut params);

        let page = QueryBuilder::new(self.bids.query(), &params)
            .with_config(self.listing)
            .search(&SEARCHABLE_FIELDS)
            .filter()
            .sort_or(DEFAULT_SORT)
            .paginate()
            .fields()
            .page()
            .await?;

        Ok(page.map(|mut document| {
            if let Some(origin) = origin {
                annotate_distance(&mut document, origin);
            }
            document_to_json(document)
        }))
    }

    #[instrument(skip(self, input))]
    pub async fn update_bid(&self, id: Uuid, input: UpdateBid) -> BidResult<Bid> {
        input
            .validate()
            .map_err(|e| BidError::Validation(e.to_string()))?;
        if input.is_empty() {
            return Err(BidError::Validation("Nothing to update".to_string()));
        }

        let mut set = doc! { "updatedAt": now_timestamp() };
        if let Some(status) = input.status {
            set.insert("status", status.to_string());
        }
        if let Some(rate) = input.rate {
            set.insert("rate", rate);
        }

        let outcome = self.bids.update_one(by_id(id), doc! { "$set": set }).await?;
        if !outcome.found() {
            return Err(BidError::NotFound(id));
        }
        self.get_bid(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_bid(&self, id: Uuid) -> BidResult<()> {
        if !self.bids.soft_delete(by_id(id)).await? {
            return Err(BidError::NotFound(id));
        }
        tracing::info!(bid_id = %id, "Bid soft-deleted");
        Ok(())
    }
}

impl<S: DocumentStore> Clone for BidService<S> {
    fn clone(&self) -> Self {
        Self {
            bids: Arc::clone(&self.bids),
            listing: self.listing,
        }
    }
}

fn by_id(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}
