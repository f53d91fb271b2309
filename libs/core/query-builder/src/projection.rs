use document_store::bson::Document;
use tracing::debug;

use crate::fields::is_valid_field_name;

/// Field selection parsed from `fields=a,b` (inclusion) or `fields=-a`
/// (exclusion).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Projection {
    pub fn parse(raw: &str) -> Self {
        let mut projection = Self::default();
        for token in raw.split([',', ' ']).map(str::trim).filter(|t| !t.is_empty()) {
            let (field, target) = match token.strip_prefix('-') {
                Some(field) => (field, &mut projection.exclude),
                None => (token, &mut projection.include),
            };
            if !is_valid_field_name(field) {
                debug!(token, "Ignoring invalid projection token");
                continue;
            }
            if !target.iter().any(|existing| existing == field) {
                target.push(field.to_string());
            }
        }
        projection
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// MongoDB projection, or `None` for "all fields".
    ///
    /// MongoDB cannot mix inclusion and exclusion, so when both appear the
    /// inclusions win; only `-_id` survives alongside them.
    pub fn to_document(&self) -> Option<Document> {
        let mut projection = Document::new();
        if self.include.is_empty() {
            for field in &self.exclude {
                projection.insert(field.as_str(), 0);
            }
        } else {
            for field in &self.include {
                projection.insert(field.as_str(), 1);
            }
            if self.exclude.iter().any(|field| field == "_id") {
                projection.insert("_id", 0);
            }
        }
        (!projection.is_empty()).then_some(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::bson::doc;

    #[test]
    fn test_inclusion() {
        let projection = Projection::parse("name,email");
        assert_eq!(projection.to_document(), Some(doc! { "name": 1, "email": 1 }));
    }

    #[test]
    fn test_exclusion() {
        let projection = Projection::parse("-message -phone");
        assert_eq!(projection.to_document(), Some(doc! { "message": 0, "phone": 0 }));
    }

    #[test]
    fn test_mixed_keeps_inclusions_and_id_exclusion() {
        let projection = Projection::parse("name,-message,-_id");
        assert_eq!(projection.to_document(), Some(doc! { "name": 1, "_id": 0 }));
    }

    #[test]
    fn test_invalid_tokens_leave_all_fields() {
        let projection = Projection::parse("$where,,-");
        assert!(projection.is_empty());
        assert_eq!(projection.to_document(), None);
    }
}
