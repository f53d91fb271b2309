//! Contact service: submissions, listing and the soft-delete lifecycle

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

use crate::error::{ContactError, ContactResult};
use crate::models::{Contact, CreateContact, UpdateContactStatus};

pub const COLLECTION: &str = "contacts";

/// Fields matched by `searchTerm`
pub const SEARCHABLE_FIELDS: [&str; 3] = ["name", "email", "subject"];

/// Listing order when the caller sends no `sort`
pub const DEFAULT_SORT: &str = "-createdAt";

pub struct ContactService<S: DocumentStore> {
    contacts: Arc<SoftDeleteCollection<S>>,
    listing: ListingConfig,
}

impl<S: DocumentStore> ContactService<S> {
    pub fn new(store: S) -> Self {
        Self {
            contacts: Arc::new(SoftDeleteCollection::new(store)),
            listing: ListingConfig::default(),
        }
    }

    pub fn with_listing_config(mut self, listing: ListingConfig) -> Self {
        self.listing = listing;
        self
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_contact(&self, input: CreateContact) -> ContactResult<Contact> {
        input
            .validate()
            .map_err(|e| ContactError::Validation(e.to_string()))?;

        let contact = Contact::new(input);
        self.contacts.insert_one(bson::to_document(&contact)?).await?;
        tracing::info!(contact_id = %contact.id, "Contact submitted");
        Ok(contact)
    }

    #[instrument(skip(self))]
    pub async fn get_contact(&self, id: Uuid) -> ContactResult<Contact> {
        let document = self
            .contacts
            .find_one(by_id(id))
            .await?
            .ok_or(ContactError::NotFound(id))?;
        Ok(bson::from_document(document)?)
    }

    /// Search over name, email and subject; newest first unless `sort` says otherwise.
    #[instrument(skip(self, params))]
    pub async fn list_contacts(&self, params: &QueryParams) -> ContactResult<Paginated<Value>> {
        let page = QueryBuilder::new(self.contacts.query(), params)
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

    #[instrument(skip(self, input))]
    pub async fn update_status(&self, id: Uuid, input: UpdateContactStatus) -> ContactResult<Contact> {
        let update = doc! {
            "$set": { "status": input.status.to_string(), "updatedAt": now_timestamp() }
        };
        let outcome = self.contacts.update_one(by_id(id), update).await?;
        if !outcome.found() {
            return Err(ContactError::NotFound(id));
        }
        self.get_contact(id).await
    }

    /// Soft delete; the submission stays stored but disappears from every read.
    #[instrument(skip(self))]
    pub async fn delete_contact(&self, id: Uuid) -> ContactResult<()> {
        if !self.contacts.soft_delete(by_id(id)).await? {
            return Err(ContactError::NotFound(id));
        }
        tracing::info!(contact_id = %id, "Contact soft-deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn restore_contact(&self, id: Uuid) -> ContactResult<Contact> {
        if !self.contacts.restore(by_id(id)).await? {
            return Err(ContactError::NotFound(id));
        }
        self.get_contact(id).await
    }
}

impl<S: DocumentStore> Clone for ContactService<S> {
    fn clone(&self) -> Self {
        Self {
            contacts: Arc::clone(&self.contacts),
            listing: self.listing,
        }
    }
}

fn by_id(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactStatus;
    use document_store::{MockDocumentStore, StoreError, UpdateOutcome};
    use mockall::predicate::eq;

    fn input() -> CreateContact {
        CreateContact {
            name: "Acme Corp".into(),
            email: "sales@acme.test".into(),
            phone: None,
            subject: Some("Wholesale".into()),
            message: "Hello".into(),
        }
    }

    #[tokio::test]
    async fn test_create_contact_inserts_active_document() {
        let mut store = MockDocumentStore::new();
        store
            .expect_insert_one()
            .withf(|document| {
                document.get_str("status").ok() == Some("new")
                    && document.get_bool("isDeleted").ok() == Some(false)
                    && document.get_str("email").ok() == Some("sales@acme.test")
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = ContactService::new(store);
        let contact = service.create_contact(input()).await.unwrap();
        assert_eq!(contact.status, ContactStatus::New);
    }

    #[tokio::test]
    async fn test_create_contact_rejects_invalid_input() {
        let mut store = MockDocumentStore::new();
        store.expect_insert_one().never();

        let mut bad = input();
        bad.email = "nope".into();
        let result = ContactService::new(store).create_contact(bad).await;
        assert!(matches!(result, Err(ContactError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_contact_reads_through_guard() {
        let id = Uuid::now_v7();
        let mut store = MockDocumentStore::new();
        store
            .expect_find_one()
            .with(eq(doc! { "$and": [ { "_id": id.to_string() }, { "isDeleted": { "$ne": true } } ] }))
            .times(1)
            .returning(|_| Ok(None));

        let result = ContactService::new(store).get_contact(id).await;
        assert!(matches!(result, Err(ContactError::NotFound(found)) if found == id));
    }

    #[tokio::test]
    async fn test_update_status_of_missing_contact() {
        let mut store = MockDocumentStore::new();
        store
            .expect_update_one()
            .times(1)
            .returning(|_, _| Ok(UpdateOutcome { matched: 0, modified: 0 }));
        store.expect_find_one().never();

        let result = ContactService::new(store)
            .update_status(Uuid::now_v7(), UpdateContactStatus { status: ContactStatus::Read })
            .await;
        assert!(matches!(result, Err(ContactError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let mut store = MockDocumentStore::new();
        store.expect_delete_one().never();
        store
            .expect_update_one()
            .withf(|_, update| {
                update
                    .get_document("$set")
                    .is_ok_and(|set| set.get_bool("isDeleted").ok() == Some(true))
            })
            .times(1)
            .returning(|_, _| Ok(UpdateOutcome { matched: 1, modified: 1 }));

        ContactService::new(store).delete_contact(Uuid::now_v7()).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find()
            .returning(|_, _| Err(StoreError::InvalidQuery("boom".into())));
        store.expect_count().returning(|_| Ok(0));

        let result = ContactService::new(store)
            .list_contacts(&QueryParams::parse("status=new"))
            .await;
        assert!(matches!(result, Err(ContactError::Store(StoreError::InvalidQuery(_)))));
    }
}
