const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("USA", "United States"),
    ("US", "United States"),
    ("United States of America", "United States"),
    ("UK", "United Kingdom"),
    ("UAE", "United Arab Emirates"),
    ("South Korea", "Korea, Rep."),
    ("North Korea", "Korea, Dem. People's Rep."),
];

/// Maps request spellings onto the dataset's jurisdiction names.
pub fn normalize_country(value: &str) -> String {
    let trimmed = value.trim();
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

pub(crate) fn lookup_key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_dataset_names() {
        assert_eq!(normalize_country(" USA "), "United States");
        assert_eq!(normalize_country("South Korea"), "Korea, Rep.");
        assert_eq!(normalize_country("Pakistan"), "Pakistan");
    }

    #[test]
    fn lookup_key_is_case_insensitive() {
        assert_eq!(lookup_key("  Viet Nam "), "viet nam");
    }
}
