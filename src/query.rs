#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Id(String),
    Email(String),
}

/// Exact-match only: digits select an ID lookup, anything with `@` an email lookup.
pub fn classify(raw: &str) -> Option<SearchQuery> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        Some(SearchQuery::Id(trimmed.to_string()))
    } else if trimmed.contains('@') {
        Some(SearchQuery::Email(trimmed.to_lowercase()))
    } else {
        None
    }
}
