use document_store::bson::doc;
use mongodb::IndexModel;
use mongodb::options::IndexOptions;

pub fn indexes() -> Vec<IndexModel> {
    vec![
        IndexModel::builder()
            .keys(doc! { "isDeleted": 1, "createdAt": -1 })
            .build(),
        // one active coupon per code; inactive and deleted ones may repeat it
        IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(
                IndexOptions::builder()
                    .name("code_active_unique".to_string())
                    .unique(true)
                    .partial_filter_expression(doc! { "active": true, "isDeleted": false })
                    .build(),
            )
            .build(),
    ]
}
