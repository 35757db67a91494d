//! URL slug derivation for manufacturers, models, posts, builders, and categories.

/// Lowercases ASCII alphanumerics and collapses every other run of characters into one dash.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch == '\'' || ch == '\u{2019}' {
            // "Wolf's Den" reads better as wolfs-den than wolf-s-den
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Uses the supplied slug when present, otherwise derives one from `fallback`.
pub fn resolve(explicit: Option<&str>, fallback: &str) -> String {
    match explicit.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.to_string(),
        None => slugify(fallback),
    }
}
