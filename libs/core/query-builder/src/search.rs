use document_store::bson::{Bson, Document, doc};

use crate::fields::is_valid_field_name;

/// `{ $or: [ { field: { $regex, $options: "i" } }, ... ] }` over the
/// searchable fields, matching `term` literally as a substring.
///
/// `None` when the term is blank or no usable field is given.
pub fn search_condition(term: &str, searchable_fields: &[&str]) -> Option<Document> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let pattern = regex::escape(term);
    let clauses: Vec<Bson> = searchable_fields
        .iter()
        .filter(|field| is_valid_field_name(field))
        .map(|field| Bson::Document(doc! { *field: { "$regex": pattern.as_str(), "$options": "i" } }))
        .collect();

    (!clauses.is_empty()).then(|| doc! { "$or": clauses })
}
