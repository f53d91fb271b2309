use document_store::bson::doc;
use mongodb::IndexModel;

/// Indexes backing the default listing order and the common filters.
pub fn indexes() -> Vec<IndexModel> {
    vec![
        IndexModel::builder()
            .keys(doc! { "isDeleted": 1, "createdAt": -1 })
            .build(),
        IndexModel::builder()
            .keys(doc! { "status": 1, "createdAt": -1 })
            .build(),
        IndexModel::builder().keys(doc! { "email": 1 }).build(),
    ]
}
