use document_store::bson::doc;
use mongodb::IndexModel;

/// Bids are listed newest first and ranked per product by rate.
pub fn indexes() -> Vec<IndexModel> {
    vec![
        IndexModel::builder()
            .keys(doc! { "isDeleted": 1, "createdAt": -1 })
            .build(),
        IndexModel::builder()
            .keys(doc! { "productId": 1, "rate": -1 })
            .build(),
        IndexModel::builder()
            .keys(doc! { "bidderId": 1, "createdAt": -1 })
            .build(),
    ]
}
