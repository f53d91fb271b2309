/// Upper bound on a field path accepted from a query string.
const MAX_FIELD_LEN: usize = 100;

/// Whether `name` is safe to use as a document field path.
///
/// Accepts letters, digits, `_`, `-` and single dots between segments.
/// Anything starting with or containing `$` is refused, which keeps raw
/// query operators out of field positions.
pub fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_FIELD_LEN
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}
