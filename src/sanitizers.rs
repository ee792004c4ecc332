//! Built-in leaf transforms. Each runs only after every check of its rule passed.

use crate::types::Sanitizer;

/// HTML-escapes `&`, `<`, `>`, `"` and `'`.
pub fn escape() -> Sanitizer {
    Sanitizer::new(|value| {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                c => out.push(c),
            }
        }
        out
    })
}

pub fn trim() -> Sanitizer {
    Sanitizer::new(|value| value.trim().to_string())
}

pub fn lower_case() -> Sanitizer {
    Sanitizer::new(str::to_lowercase)
}

pub fn upper_case() -> Sanitizer {
    Sanitizer::new(str::to_uppercase)
}

/// Replaces every occurrence of `search`. An empty `search` leaves the value as is.
pub fn replace(search: impl Into<String>, replacement: impl Into<String>) -> Sanitizer {
    let search = search.into();
    let replacement = replacement.into();
    Sanitizer::new(move |value| {
        if search.is_empty() {
            value.to_string()
        } else {
            value.replace(&search, &replacement)
        }
    })
}
