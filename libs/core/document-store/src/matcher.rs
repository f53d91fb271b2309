//! In-process evaluation of the MongoDB query subset the services use.
//!
//! Supported filter syntax: implicit equality, `$and`, `$or`, `$nor`, `$eq`,
//! `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`, `$regex`
//! with `$options`. Missing fields behave as in MongoDB: `$ne` and `$nin`
//! match them, range operators never do. Anything else is rejected with
//! [`StoreError::UnsupportedOperator`] rather than silently ignored.

use mongodb::bson::{Bson, Document};
use regex::RegexBuilder;
use std::cmp::Ordering;

use crate::error::{StoreError, StoreResult};

/// Resolve a dotted path (`location.lat`) inside `doc`.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

pub(crate) fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
    }
}

pub(crate) fn remove_path(doc: &mut Document, path: &str) -> Option<Bson> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head) {
            Some(Bson::Document(inner)) => remove_path(inner, rest),
            _ => None,
        },
    }
}

/// Does `doc` satisfy `filter`?
pub fn matches(doc: &Document, filter: &Document) -> StoreResult<bool> {
    for (key, condition) in filter {
        let satisfied = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, condition)? {
                    if !matches(doc, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => any_clause(doc, key, condition)?,
            "$nor" => !any_clause(doc, key, condition)?,
            op if op.starts_with('$') => {
                return Err(StoreError::UnsupportedOperator(op.to_string()));
            }
            field => matches_field(get_path(doc, field), condition)?,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_clause(doc: &Document, op: &str, condition: &Bson) -> StoreResult<bool> {
    for clause in clauses(op, condition)? {
        if matches(doc, clause)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn clauses<'a>(op: &str, condition: &'a Bson) -> StoreResult<Vec<&'a Document>> {
    let Bson::Array(items) = condition else {
        return Err(StoreError::InvalidQuery(format!("{op} expects an array")));
    };
    items
        .iter()
        .map(|item| {
            item.as_document()
                .ok_or_else(|| StoreError::InvalidQuery(format!("{op} entries must be documents")))
        })
        .collect()
}

fn matches_field(value: Option<&Bson>, condition: &Bson) -> StoreResult<bool> {
    match condition {
        Bson::Document(ops) if is_operator_document(ops) => matches_operators(value, ops),
        Bson::RegularExpression(regex) => matches_regex(value, &regex.pattern, &regex.options),
        expected => Ok(equals_or_contains(value, expected)),
    }
}

fn is_operator_document(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|key| key.starts_with('$'))
}

fn matches_operators(value: Option<&Bson>, ops: &Document) -> StoreResult<bool> {
    for (op, operand) in ops {
        let satisfied = match op.as_str() {
            "$eq" => equals_or_contains(value, operand),
            "$ne" => !equals_or_contains(value, operand),
            "$gt" => compares(value, operand, |o| o == Ordering::Greater),
            "$gte" => compares(value, operand, |o| o != Ordering::Less),
            "$lt" => compares(value, operand, |o| o == Ordering::Less),
            "$lte" => compares(value, operand, |o| o != Ordering::Greater),
            "$in" => in_set(value, operand)?,
            "$nin" => !in_set(value, operand)?,
            "$exists" => value.is_some() == truthy(operand),
            "$regex" => {
                let options = ops.get_str("$options").unwrap_or("");
                match operand {
                    Bson::String(pattern) => matches_regex(value, pattern, options)?,
                    Bson::RegularExpression(regex) => {
                        let combined = format!("{}{}", regex.options, options);
                        matches_regex(value, &regex.pattern, &combined)?
                    }
                    _ => {
                        return Err(StoreError::InvalidQuery(
                            "$regex expects a string pattern".to_string(),
                        ));
                    }
                }
            }
            // read together with $regex
            "$options" => true,
            other => return Err(StoreError::UnsupportedOperator(other.to_string())),
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn equals_or_contains(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => matches!(expected, Bson::Null),
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| bson_equal(item, expected))
        }
        Some(actual) => bson_equal(actual, expected),
    }
}

fn compares(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    match value {
        None => false,
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| compare_values(item, operand).is_some_and(&accept)),
        Some(actual) => compare_values(actual, operand).is_some_and(accept),
    }
}

fn in_set(value: Option<&Bson>, operand: &Bson) -> StoreResult<bool> {
    let Bson::Array(candidates) = operand else {
        return Err(StoreError::InvalidQuery("$in/$nin expects an array".to_string()));
    };
    for candidate in candidates {
        let hit = match candidate {
            Bson::RegularExpression(regex) => matches_regex(value, &regex.pattern, &regex.options)?,
            other => equals_or_contains(value, other),
        };
        if hit {
            return Ok(true);
        }
    }
    Ok(false)
}

fn matches_regex(value: Option<&Bson>, pattern: &str, options: &str) -> StoreResult<bool> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .build()
        .map_err(|e| StoreError::InvalidQuery(format!("invalid $regex: {e}")))?;

    Ok(match value {
        Some(Bson::String(text)) => regex.is_match(text),
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(text) if regex.is_match(text))),
        _ => false,
    })
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn bson_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Order two values of the same type bracket; `None` across brackets,
/// where MongoDB comparison operators never match.
fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.cmp(y)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null => false,
        other => as_number(other).is_none_or(|n| n != 0.0),
    }
}

/// MongoDB's cross-type sort order, missing and null first.
fn sort_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)) => 1,
        Some(Bson::String(_) | Bson::Symbol(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::Binary(_)) => 5,
        Some(Bson::ObjectId(_)) => 6,
        Some(Bson::Boolean(_)) => 7,
        Some(Bson::DateTime(_)) => 8,
        Some(Bson::Timestamp(_)) => 9,
        Some(Bson::RegularExpression(_)) => 10,
        Some(_) => 11,
    }
}

pub fn compare_for_sort(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (rank_a, rank_b) = (sort_rank(a), sort_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }
    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Stable in-place sort by a MongoDB sort document (`{field: 1 | -1}`).
pub fn sort_documents(docs: &mut [Document], sort: &Document) -> StoreResult<()> {
    let keys = sort
        .iter()
        .map(|(field, direction)| match as_number(direction) {
            Some(d) if d == 1.0 || d == -1.0 => Ok((field.as_str(), d < 0.0)),
            _ => Err(StoreError::InvalidQuery(format!(
                "sort direction for '{field}' must be 1 or -1"
            ))),
        })
        .collect::<StoreResult<Vec<_>>>()?;

    docs.sort_by(|a, b| {
        for (field, descending) in &keys {
            let ordering = compare_for_sort(get_path(a, field), get_path(b, field));
            if ordering != Ordering::Equal {
                return if *descending {
                    ordering.reverse()
                } else {
                    ordering
                };
            }
        }
        Ordering::Equal
    });
    Ok(())
}

/// Apply an inclusion or exclusion projection.
pub fn project(doc: &Document, projection: &Document) -> StoreResult<Document> {
    let include_id = projection.get("_id").is_none_or(truthy);
    let fields: Vec<(&str, bool)> = projection
        .iter()
        .filter(|(field, _)| field.as_str() != "_id")
        .map(|(field, flag)| (field.as_str(), truthy(flag)))
        .collect();

    let inclusion = match fields.first() {
        Some((_, first)) => *first,
        // only `_id` was specified
        None => projection.get("_id").is_some_and(truthy),
    };
    if let Some((field, _)) = fields.iter().find(|(_, flag)| *flag != inclusion) {
        return Err(StoreError::InvalidQuery(format!(
            "cannot mix inclusion and exclusion in projection (field '{field}')"
        )));
    }

    if inclusion {
        let mut projected = Document::new();
        if include_id {
            if let Some(id) = doc.get("_id") {
                projected.insert("_id", id.clone());
            }
        }
        for (field, _) in fields {
            if let Some(value) = get_path(doc, field) {
                set_path(&mut projected, field, value.clone());
            }
        }
        Ok(projected)
    } else {
        let mut projected = doc.clone();
        if !include_id {
            projected.remove("_id");
        }
        for (field, _) in fields {
            remove_path(&mut projected, field);
        }
        Ok(projected)
    }
}

/// Apply a MongoDB update document (`$set`, `$unset`, `$inc`) or a
/// replacement document. Returns whether `doc` changed.
pub fn apply_update(doc: &mut Document, update: &Document) -> StoreResult<bool> {
    let before = doc.clone();

    if !is_operator_document(update) {
        let mut replacement = Document::new();
        if let Some(id) = before.get("_id") {
            replacement.insert("_id", id.clone());
        }
        for (field, value) in update.iter().filter(|(field, _)| field.as_str() != "_id") {
            replacement.insert(field.clone(), value.clone());
        }
        *doc = replacement;
        return Ok(*doc != before);
    }

    for (op, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(StoreError::InvalidQuery(format!("{op} expects a document")));
        };
        match op.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(doc, path, value.clone());
                }
            }
            "$unset" => {
                for path in fields.keys() {
                    remove_path(doc, path);
                }
            }
            "$inc" => {
                for (path, delta) in fields {
                    let next = increment(get_path(doc, path), delta)
                        .ok_or_else(|| StoreError::InvalidQuery(format!("cannot $inc '{path}'")))?;
                    set_path(doc, path, next);
                }
            }
            other => return Err(StoreError::UnsupportedOperator(other.to_string())),
        }
    }

    Ok(*doc != before)
}

fn increment(current: Option<&Bson>, delta: &Bson) -> Option<Bson> {
    match (current, delta) {
        (None, d) => as_number(d).map(|_| d.clone()),
        (Some(Bson::Int32(a)), Bson::Int32(b)) => Some(Bson::Int32(a.checked_add(*b)?)),
        (Some(Bson::Int64(a)), Bson::Int32(b)) => Some(Bson::Int64(a.checked_add(i64::from(*b))?)),
        (Some(Bson::Int32(a)), Bson::Int64(b)) => Some(Bson::Int64(i64::from(*a).checked_add(*b)?)),
        (Some(Bson::Int64(a)), Bson::Int64(b)) => Some(Bson::Int64(a.checked_add(*b)?)),
        (Some(a), d) => Some(Bson::Double(as_number(a)? + as_number(d)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn bid() -> Document {
        doc! {
            "_id": "b1",
            "bidderName": "Acme Corp",
            "rate": 150,
            "tags": ["urgent", "export"],
            "location": { "lat": 52.5, "lng": 13.4 },
        }
    }

    #[test]
    fn test_get_path_nested() {
        let doc = bid();
        assert_eq!(get_path(&doc, "location.lat"), Some(&Bson::Double(52.5)));
        assert_eq!(get_path(&doc, "location.alt"), None);
        assert_eq!(get_path(&doc, "rate.value"), None);
    }

    #[test]
    fn test_implicit_equality_and_array_contains() {
        let doc = bid();
        assert!(matches(&doc, &doc! { "bidderName": "Acme Corp" }).unwrap());
        assert!(matches(&doc, &doc! { "tags": "urgent" }).unwrap());
        assert!(!matches(&doc, &doc! { "tags": "domestic" }).unwrap());
    }

    #[test]
    fn test_numeric_comparison_crosses_int_and_double() {
        let doc = bid();
        assert!(matches(&doc, &doc! { "rate": { "$gte": 100.0, "$lte": 200_i64 } }).unwrap());
        assert!(!matches(&doc, &doc! { "rate": { "$gt": 150 } }).unwrap());
        assert!(matches(&doc, &doc! { "rate": 150.0 }).unwrap());
    }

    #[test]
    fn test_range_operators_do_not_cross_types() {
        let doc = bid();
        assert!(!matches(&doc, &doc! { "rate": { "$gte": "100" } }).unwrap());
        assert!(!matches(&doc, &doc! { "missing": { "$lt": 10 } }).unwrap());
    }

    #[test]
    fn test_ne_matches_missing_field() {
        let doc = bid();
        assert!(matches(&doc, &doc! { "isDeleted": { "$ne": true } }).unwrap());

        let deleted = doc! { "isDeleted": true };
        assert!(!matches(&deleted, &doc! { "isDeleted": { "$ne": true } }).unwrap());
    }

    #[test]
    fn test_in_nin_exists() {
        let doc = bid();
        assert!(matches(&doc, &doc! { "bidderName": { "$in": ["Globex", "Acme Corp"] } }).unwrap());
        assert!(matches(&doc, &doc! { "bidderName": { "$nin": ["Globex"] } }).unwrap());
        assert!(matches(&doc, &doc! { "location": { "$exists": true } }).unwrap());
        assert!(matches(&doc, &doc! { "deletedAt": { "$exists": false } }).unwrap());
    }

    #[test]
    fn test_regex_with_options() {
        let doc = bid();
        let filter = doc! { "bidderName": { "$regex": "acme", "$options": "i" } };
        assert!(matches(&doc, &filter).unwrap());
        let filter = doc! { "bidderName": { "$regex": "acme" } };
        assert!(!matches(&doc, &filter).unwrap());
    }

    #[test]
    fn test_logical_operators() {
        let doc = bid();
        let filter = doc! { "$or": [ { "rate": 1 }, { "bidderName": "Acme Corp" } ] };
        assert!(matches(&doc, &filter).unwrap());
        let filter = doc! { "$and": [ { "rate": 150 }, { "bidderName": "Globex" } ] };
        assert!(!matches(&doc, &filter).unwrap());
        let filter = doc! { "$nor": [ { "rate": 1 } ] };
        assert!(matches(&doc, &filter).unwrap());
    }

    #[test]
    fn test_unknown_operators_are_rejected() {
        let doc = bid();
        assert!(matches!(
            matches(&doc, &doc! { "$where": "true" }),
            Err(StoreError::UnsupportedOperator(op)) if op == "$where"
        ));
        assert!(matches!(
            matches(&doc, &doc! { "rate": { "$mod": [2, 0] } }),
            Err(StoreError::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn test_sort_documents_multi_key() {
        let mut docs = vec![
            doc! { "_id": 1, "rate": 10, "name": "b" },
            doc! { "_id": 2, "rate": 20, "name": "a" },
            doc! { "_id": 3, "rate": 10, "name": "a" },
            doc! { "_id": 4, "name": "z" },
        ];
        sort_documents(&mut docs, &doc! { "rate": -1, "name": 1 }).unwrap();
        let ids: Vec<i32> = docs.iter().map(|d| d.get_i32("_id").unwrap()).collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_sort_rejects_bad_direction() {
        let mut docs = vec![bid()];
        assert!(sort_documents(&mut docs, &doc! { "rate": "up" }).is_err());
    }

    #[test]
    fn test_inclusion_projection_keeps_id() {
        let projected = project(&bid(), &doc! { "bidderName": 1, "location.lat": 1 }).unwrap();
        assert_eq!(
            projected,
            doc! { "_id": "b1", "bidderName": "Acme Corp", "location": { "lat": 52.5 } }
        );
    }

    #[test]
    fn test_exclusion_projection() {
        let projected = project(&bid(), &doc! { "tags": 0, "location": 0, "_id": 0 }).unwrap();
        assert_eq!(projected, doc! { "bidderName": "Acme Corp", "rate": 150 });
    }

    #[test]
    fn test_mixed_projection_is_rejected() {
        assert!(project(&bid(), &doc! { "rate": 1, "tags": 0 }).is_err());
    }

    #[test]
    fn test_apply_update_operators() {
        let mut doc = bid();
        let changed = apply_update(
            &mut doc,
            &doc! {
                "$set": { "status": "accepted", "location.lat": 48.1 },
                "$unset": { "tags": "" },
                "$inc": { "rate": 5, "revisions": 1 },
            },
        )
        .unwrap();

        assert!(changed);
        assert_eq!(doc.get_str("status").unwrap(), "accepted");
        assert_eq!(get_path(&doc, "location.lat"), Some(&Bson::Double(48.1)));
        assert!(doc.get("tags").is_none());
        assert_eq!(doc.get_i32("rate").unwrap(), 155);
        assert_eq!(doc.get_i32("revisions").unwrap(), 1);
    }

    #[test]
    fn test_apply_update_replacement_keeps_id() {
        let mut doc = bid();
        apply_update(&mut doc, &doc! { "bidderName": "Globex" }).unwrap();
        assert_eq!(doc, doc! { "_id": "b1", "bidderName": "Globex" });
    }

    #[test]
    fn test_apply_update_reports_no_change() {
        let mut doc = bid();
        assert!(!apply_update(&mut doc, &doc! { "$set": { "rate": 150 } }).unwrap());
    }
}
