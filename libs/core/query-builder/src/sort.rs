use document_store::bson::{Document, doc};
use tracing::debug;

use crate::fields::is_valid_field_name;

/// Secondary key appended to every applied sort.
pub const TIE_BREAKER: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered sort keys parsed from `field,-field2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Tokens may be separated by commas or spaces. A leading `-` means
    /// descending. Invalid or repeated fields are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut keys: Vec<SortKey> = Vec::new();
        for token in raw.split([',', ' ']).map(str::trim).filter(|t| !t.is_empty()) {
            let (field, direction) = match token.strip_prefix('-') {
                Some(field) => (field, SortDirection::Descending),
                None => (token, SortDirection::Ascending),
            };
            if !is_valid_field_name(field) {
                debug!(token, "Ignoring invalid sort token");
                continue;
            }
            if keys.iter().any(|key| key.field == field) {
                continue;
            }
            keys.push(SortKey {
                field: field.to_string(),
                direction,
            });
        }
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// MongoDB sort document. Unless `_id` is already a key it is appended
    /// in the direction of the last key, so ties resolve deterministically
    /// and reversing every key reverses the whole sequence.
    pub fn to_document(&self) -> Document {
        let mut sort = Document::new();
        for key in &self.keys {
            sort.insert(key.field.as_str(), key.direction.as_i32());
        }
        if let Some(last) = self.keys.last() {
            if !sort.contains_key(TIE_BREAKER) {
                sort.extend(doc! { TIE_BREAKER: last.direction.as_i32() });
            }
        }
        sort
    }
}
