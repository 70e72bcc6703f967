/// Join a field selection into the service's comma separated syntax.
///
/// An empty selection means "no restriction" and yields `None`.
pub fn join_fields(fields: &[String]) -> Option<String> {
    if fields.is_empty() {
        None
    } else {
        Some(fields.join(","))
    }
}

/// Split a comma separated selection coming from the command line.
pub fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}
