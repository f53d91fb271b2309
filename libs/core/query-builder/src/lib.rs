//! Listing engine for marketplace collections.
//!
//! Turns untrusted query-string parameters into a safe document query:
//!
//! - `searchTerm=acme`: case-insensitive substring match over caller-chosen fields
//! - `status=new`, `rate[gte]=100`: exact and comparison filters
//!   (`gt`, `gte`, `lt`, `lte`, `ne`, `in` only)
//! - `sort=-createdAt,name`, `fields=name,email`, `page=2&limit=20`
//!
//! Anything malformed is dropped rather than rejected. Results come back as
//! [`Paginated`] with `{ total, page, limit }` metadata where `total` ignores
//! the page window.

pub mod builder;
pub mod config;
pub mod fields;
pub mod filter;
pub mod meta;
pub mod pagination;
pub mod params;
pub mod projection;
pub mod search;
pub mod sort;

pub use builder::QueryBuilder;
pub use config::ListingConfig;
pub use filter::{ComparisonOp, FieldFilter, FilterSet, FilterValue};
pub use meta::{ListMeta, Paginated};
pub use pagination::{DEFAULT_LIMIT, Pagination};
pub use params::{ListingParams, ParamValue, QueryParams};
pub use projection::Projection;
pub use search::search_condition;
pub use sort::SortSpec;
