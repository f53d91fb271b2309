//! Turning untyped filter parameters into typed, allow-listed conditions.
//!
//! `field=value` is an exact match and `field[op]=value` a comparison with
//! `op` one of `gt`, `gte`, `lt`, `lte`, `ne`, `in`. Parsing is fail-open:
//! unknown operators, unsafe field names, empty values and fields owned by
//! the soft-delete guard are dropped as if the parameter were absent.

use document_store::bson::{Bson, Document, doc};
use document_store::soft_delete::is_guard_field;
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use crate::fields::is_valid_field_name;
use crate::params::{ParamValue, QueryParams};

/// The only comparison operators a caller can reach.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum ComparisonOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
    In,
}

impl ComparisonOp {
    pub fn mongo_operator(self) -> &'static str {
        match self {
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
            ComparisonOp::Ne => "$ne",
            ComparisonOp::In => "$in",
        }
    }

    fn is_range(self) -> bool {
        matches!(
            self,
            ComparisonOp::Gt | ComparisonOp::Gte | ComparisonOp::Lt | ComparisonOp::Lte
        )
    }
}

/// A coerced filter value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// `"true"`/`"false"` become booleans, everything else stays text.
    pub fn exact(raw: &str) -> Self {
        match raw {
            "true" => FilterValue::Bool(true),
            "false" => FilterValue::Bool(false),
            other => FilterValue::Text(other.to_string()),
        }
    }

    /// Numbers when the value parses as one, text otherwise.
    pub fn numeric(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return FilterValue::Int(n);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => FilterValue::Float(n),
            _ => FilterValue::Text(raw.to_string()),
        }
    }

    /// The text itself plus its numeric reading when it has one, so a
    /// value matches whether the field stores `"100"` or `100`.
    pub fn either(raw: &str) -> Vec<Self> {
        match FilterValue::numeric(raw) {
            FilterValue::Text(_) => vec![FilterValue::exact(raw)],
            number => vec![FilterValue::Text(raw.to_string()), number],
        }
    }

    pub fn to_bson(&self) -> Bson {
        match self {
            FilterValue::Text(s) => Bson::String(s.clone()),
            FilterValue::Int(n) => Bson::Int64(*n),
            FilterValue::Float(n) => Bson::Double(*n),
            FilterValue::Bool(b) => Bson::Boolean(*b),
            FilterValue::List(items) => Bson::Array(items.iter().map(FilterValue::to_bson).collect()),
        }
    }
}

/// Per-field filter: an exact match or a set of comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    Exact(FilterValue),
    Compare(Vec<(ComparisonOp, FilterValue)>),
}

impl FieldFilter {
    pub fn to_condition(&self, field: &str) -> Document {
        match self {
            FieldFilter::Exact(FilterValue::List(values)) => {
                let values: Vec<Bson> = values.iter().map(FilterValue::to_bson).collect();
                doc! { field: { "$in": values } }
            }
            FieldFilter::Exact(value) => doc! { field: value.to_bson() },
            FieldFilter::Compare(comparisons) => {
                let mut operators = Document::new();
                for (op, value) in comparisons {
                    let operator = match (op, value) {
                        (ComparisonOp::Ne, FilterValue::List(_)) => "$nin",
                        _ => op.mongo_operator(),
                    };
                    operators.insert(operator, value.to_bson());
                }
                doc! { field: operators }
            }
        }
    }
}

/// The filter condition set, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: Vec<(String, FieldFilter)>,
}

impl FilterSet {
    /// Build from every non-reserved parameter.
    pub fn from_params(params: &QueryParams) -> Self {
        let mut exact: BTreeMap<&str, FilterValue> = BTreeMap::new();
        let mut compare: BTreeMap<&str, BTreeMap<ComparisonOp, FilterValue>> = BTreeMap::new();

        for (key, value) in params.iter() {
            if QueryParams::is_reserved(key) {
                continue;
            }
            let Some((field, op)) = parse_key(key) else {
                debug!(key, "Ignoring filter with unknown operator");
                continue;
            };
            if !is_valid_field_name(field) || is_guard_field(field) {
                debug!(key, "Ignoring filter on disallowed field");
                continue;
            }

            match op {
                None => {
                    if let Some(filter_value) = exact_value(value) {
                        exact.insert(field, filter_value);
                    }
                }
                Some(op) => {
                    if let Some(filter_value) = comparison_value(op, value) {
                        compare.entry(field).or_default().insert(op, filter_value);
                    }
                }
            }
        }

        let mut entries = Vec::with_capacity(exact.len() + compare.len());
        for (field, value) in exact {
            entries.push((field.to_string(), FieldFilter::Exact(value)));
        }
        for (field, comparisons) in compare {
            entries.push((field.to_string(), FieldFilter::Compare(comparisons.into_iter().collect())));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, FieldFilter)] {
        &self.entries
    }

    /// One condition per entry, to be AND-combined by the query.
    pub fn conditions(&self) -> Vec<Document> {
        self.entries
            .iter()
            .map(|(field, filter)| filter.to_condition(field))
            .collect()
    }
}

/// Split `field[op]` into its parts. `None` means the key is malformed or
/// names an operator outside the allow-list.
fn parse_key(key: &str) -> Option<(&str, Option<ComparisonOp>)> {
    let Some((field, rest)) = key.split_once('[') else {
        return Some((key, None));
    };
    let token = rest.strip_suffix(']')?;
    if token.contains(['[', ']']) {
        return None;
    }
    let op = token.parse::<ComparisonOp>().ok()?;
    Some((field, Some(op)))
}

fn non_empty(value: &ParamValue) -> Vec<&str> {
    value.values().filter(|v| !v.trim().is_empty()).collect()
}

fn exact_value(value: &ParamValue) -> Option<FilterValue> {
    let values = non_empty(value);
    match values.as_slice() {
        [] => None,
        [single] => Some(FilterValue::exact(single)),
        many => Some(FilterValue::List(many.iter().map(|v| FilterValue::exact(v)).collect())),
    }
}

fn comparison_value(op: ComparisonOp, value: &ParamValue) -> Option<FilterValue> {
    if op == ComparisonOp::In {
        let items: Vec<FilterValue> = value
            .values()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .flat_map(FilterValue::either)
            .collect();
        return (!items.is_empty()).then_some(FilterValue::List(items));
    }

    let raw = non_empty(value).into_iter().next()?;
    if op.is_range() {
        return Some(FilterValue::numeric(raw));
    }
    let mut values = FilterValue::either(raw);
    Some(if values.len() == 1 {
        values.remove(0)
    } else {
        FilterValue::List(values)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(query: &str) -> Vec<Document> {
        FilterSet::from_params(&QueryParams::parse(query)).conditions()
    }

    #[test]
    fn test_exact_match_with_boolean_coercion() {
        assert_eq!(
            conditions("status=new&verified=true"),
            vec![doc! { "status": "new" }, doc! { "verified": true }]
        );
    }

    #[test]
    fn test_range_operators_merge_per_field_and_coerce_numbers() {
        assert_eq!(
            conditions("rate[gte]=100&rate[lte]=200.5"),
            vec![doc! { "rate": { "$gte": 100_i64, "$lte": 200.5 } }]
        );
    }

    #[test]
    fn test_range_operator_keeps_non_numeric_text() {
        assert_eq!(
            conditions("createdAt[gte]=2024-01-01"),
            vec![doc! { "createdAt": { "$gte": "2024-01-01" } }]
        );
    }

    #[test]
    fn test_ne_and_in() {
        assert_eq!(
            conditions("status[ne]=rejected&currency[in]=EUR,USD"),
            vec![
                doc! { "currency": { "$in": ["EUR", "USD"] } },
                doc! { "status": { "$ne": "rejected" } },
            ]
        );
    }

    #[test]
    fn test_ne_and_in_match_numbers_and_their_text() {
        assert_eq!(
            conditions("rate[ne]=100"),
            vec![doc! { "rate": { "$nin": ["100", 100_i64] } }]
        );
        assert_eq!(
            conditions("seq[in]=6,12.5,x"),
            vec![doc! { "seq": { "$in": ["6", 6_i64, "12.5", 12.5, "x"] } }]
        );
        assert_eq!(
            conditions("active[ne]=false"),
            vec![doc! { "active": { "$ne": false } }]
        );
    }

    #[test]
    fn test_in_accepts_repeated_values() {
        assert_eq!(
            conditions("tag[in]=a&tag[in]=b,c"),
            vec![doc! { "tag": { "$in": ["a", "b", "c"] } }]
        );
    }

    #[test]
    fn test_repeated_exact_key_becomes_in() {
        assert_eq!(
            conditions("status=new&status=read"),
            vec![doc! { "status": { "$in": ["new", "read"] } }]
        );
    }

    #[test]
    fn test_exact_and_comparison_on_same_field() {
        assert_eq!(
            conditions("rate=150&rate[gt]=100"),
            vec![doc! { "rate": "150" }, doc! { "rate": { "$gt": 100_i64 } }]
        );
    }

    #[test]
    fn test_unknown_operators_are_dropped() {
        assert!(conditions("rate[xyz]=1").is_empty());
        assert!(conditions("rate[$gt]=1").is_empty());
        assert!(conditions("rate[regex]=.*").is_empty());
        assert!(conditions("rate[gt][lt]=1").is_empty());
        assert!(conditions("rate[gt=1").is_empty());
    }

    #[test]
    fn test_operator_injection_through_field_name_is_dropped() {
        assert!(conditions("$where=sleep(1000)").is_empty());
        assert!(conditions("profile.$ne=1").is_empty());
        assert!(conditions("%24or=1").is_empty());
    }

    #[test]
    fn test_guard_fields_are_dropped() {
        assert!(conditions("isDeleted=true").is_empty());
        assert!(conditions("isDeleted[ne]=true&deletedAt[gte]=2020").is_empty());
    }

    #[test]
    fn test_reserved_and_empty_values_are_skipped() {
        assert!(conditions("searchTerm=x&sort=-rate&fields=a&page=2&limit=5").is_empty());
        assert!(conditions("status=&rate[gte]=").is_empty());
    }

    #[test]
    fn test_comparison_op_parsing() {
        assert_eq!("gte".parse::<ComparisonOp>().unwrap(), ComparisonOp::Gte);
        assert!("GTE".parse::<ComparisonOp>().is_err());
        assert!("nin".parse::<ComparisonOp>().is_err());
        assert_eq!(ComparisonOp::In.to_string(), "in");
    }

    #[test]
    fn test_numeric_coercion_rejects_non_finite() {
        assert_eq!(FilterValue::numeric("NaN"), FilterValue::Text("NaN".into()));
        assert_eq!(FilterValue::numeric("inf"), FilterValue::Text("inf".into()));
        assert_eq!(FilterValue::numeric(" 42 "), FilterValue::Int(42));
        assert_eq!(FilterValue::numeric("-1.5"), FilterValue::Float(-1.5));
    }
}
